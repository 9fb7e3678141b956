//! Session loading pipeline.
//!
//! Turns a [`SessionDocument`] into a [`Session`] of reconstructed, weighted
//! pulls:
//!
//! 1. Validate the phase catalog and start timestamp
//! 2. Drop trash pulls and non-player roster entries
//! 3. Deduplicate re-logged pulls and order survivors by start offset
//! 4. Reconstruct phases per pull, skipping pulls that fail lookups
//! 5. Assign each pull its share of session combat time
//!
//! Pull-level failures are reported as diagnostics and do not stop the
//! session. Session-level failures are returned as [`SessionError`].

use chrono::{DateTime, Utc};
use raidprog_core::{
    BossId, Diagnostic, EmptySessionError, EngineConfig, LookupError, PhaseCatalog,
    PlayerGuid, PlayerIdentity, PullId, SessionError, ValidationError,
    document::{PullDocument, RosterEntryDocument, SessionDocument},
    time::timestamp_from_millis,
};
use serde::Serialize;

use crate::{
    dedup::{dedup_pulls, remove_trash},
    reconstruct::{ReconstructError, ReconstructedPull, reconstruct_pull},
    summary::SessionSummary,
};

/// A roster member that is an actual player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub guid: PlayerGuid,
    pub name: String,
    pub job: String,
    pub server: String,
}

impl Player {
    #[must_use]
    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity {
            name: self.name.clone(),
            job: self.job.clone(),
        }
    }
}

impl From<&RosterEntryDocument> for Player {
    fn from(entry: &RosterEntryDocument) -> Self {
        Self {
            guid: entry.guid,
            name: entry.name.clone(),
            job: entry.job.clone(),
            server: entry.server.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub title: String,
    /// Progression tag; sessions without one are not grouped
    pub tag: Option<String>,
    pub start: DateTime<Utc>,
    pub boss: BossId,
    pub catalog: PhaseCatalog,
    /// Catalog phase names for [`Session::boss`]
    pub phase_names: Vec<String>,
    pub roster: Vec<Player>,
    /// Reconstructed pulls, strictly ordered by start offset
    pub pulls: Vec<ReconstructedPull>,
}

/// A session together with the pull-level issues found while loading it.
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub session: Session,
    pub diagnostics: Vec<Diagnostic>,
}

impl Session {
    pub fn from_document(
        doc: &SessionDocument,
        config: &EngineConfig,
    ) -> Result<LoadedSession, SessionError> {
        let title = doc.title.clone();
        let catalog = match &doc.phase_catalog {
            Some(entries) if !entries.is_empty() => PhaseCatalog::from_documents(entries),
            _ => return Err(ValidationError::MissingPhaseCatalog { title }.into()),
        };
        let start = timestamp_from_millis(doc.start_timestamp).ok_or_else(|| {
            ValidationError::InvalidStartTimestamp {
                title: title.clone(),
                timestamp_ms: doc.start_timestamp,
            }
        })?;

        let (pulls, trash) = remove_trash(doc.pulls.clone());
        let (mut pulls, duplicates) = dedup_pulls(pulls);
        pulls.sort_by_key(|p| p.start_offset_ms);
        tracing::debug!(
            session = %title,
            trash,
            duplicates,
            remaining = pulls.len(),
            "filtered pulls"
        );

        let boss = session_boss(&pulls, &catalog).ok_or_else(|| EmptySessionError {
            title: title.clone(),
        })?;

        let mut diagnostics = vec![];
        let mut reconstructed = Vec::with_capacity(pulls.len());
        for pull in &pulls {
            // uncatalogued bosses fail their own lookup inside reconstruction
            let result = if pull.boss_id == boss || catalog.phase_names(pull.boss_id).is_err() {
                reconstruct_pull(pull, &catalog, start, config.marker_offset_basis)
            } else {
                Err(ReconstructError::Lookup(LookupError::BossMismatch {
                    pull: pull.id,
                    expected: boss,
                    found: pull.boss_id,
                }))
            };
            match result {
                Ok(pull) => reconstructed.push(pull),
                Err(err) => {
                    tracing::warn!(session = %title, pull = %pull.id, "skipping pull: {err}");
                    diagnostics.push(Diagnostic::pull(&title, pull.id, &err));
                }
            }
        }

        if reconstructed.is_empty() {
            return Err(EmptySessionError { title }.into());
        }
        assign_weights(&mut reconstructed);

        let phase_names = catalog
            .phase_names(boss)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        let roster = doc
            .roster
            .iter()
            .filter(|e| e.is_player())
            .map(Player::from)
            .collect();
        let tag = progression_tag(&title, &config.tag_separator);
        if tag.is_none() {
            let err = ValidationError::MissingTag {
                title: title.clone(),
            };
            tracing::warn!(session = %title, "{err}");
            diagnostics.push(Diagnostic::session(&title, &err));
        }

        Ok(LoadedSession {
            session: Session {
                title,
                tag,
                start,
                boss,
                catalog,
                phase_names,
                roster,
                pulls: reconstructed,
            },
            diagnostics,
        })
    }

    pub fn summarize(&self) -> Result<SessionSummary, EmptySessionError> {
        SessionSummary::from_pulls(&self.pulls).ok_or_else(|| EmptySessionError {
            title: self.title.clone(),
        })
    }

    #[must_use]
    pub fn pull(&self, id: PullId) -> Option<&ReconstructedPull> {
        self.pulls.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn player(&self, guid: PlayerGuid) -> Option<&Player> {
        self.roster.iter().find(|p| p.guid == guid)
    }
}

/// The boss most pulls are for, counting only bosses in the catalog.
///
/// Ties go to the boss pulled first. If no pull's boss is in the catalog,
/// the first pull's boss is returned so that every pull fails its lookup.
fn session_boss(pulls: &[PullDocument], catalog: &PhaseCatalog) -> Option<BossId> {
    let mut counts = Vec::<(BossId, usize)>::new();
    for pull in pulls {
        if catalog.phase_names(pull.boss_id).is_err() {
            continue;
        }
        match counts.iter_mut().find(|(boss, _)| *boss == pull.boss_id) {
            Some((_, count)) => *count += 1,
            None => counts.push((pull.boss_id, 1)),
        }
    }
    // max_by_key keeps the last maximum, so scan in reverse
    counts
        .iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|&(boss, _)| boss)
        .or_else(|| pulls.first().map(|p| p.boss_id))
}

/// Sets each pull's weight to its share of the total combat time.
///
/// Weights are assigned, not accumulated, so calling this again on the same
/// pulls leaves them unchanged.
#[expect(clippy::cast_precision_loss)]
pub fn assign_weights(pulls: &mut [ReconstructedPull]) {
    let total_ms = pulls.iter().map(|p| p.combat_time_ms as f64).sum::<f64>();
    for pull in pulls {
        pull.weight = if total_ms > 0.0 {
            pull.combat_time_ms as f64 / total_ms
        } else {
            0.0
        };
    }
}

/// The first non-empty segment of `title` before `separator`, trimmed.
#[must_use]
pub fn progression_tag(title: &str, separator: &str) -> Option<String> {
    title
        .split(separator)
        .find(|s| !s.is_empty())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
