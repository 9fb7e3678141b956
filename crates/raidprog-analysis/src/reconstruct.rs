//! Phase reconstruction for individual pulls.
//!
//! The log service reports phases as bare start markers. This module turns
//! them into bounded, named intervals:
//!
//! ```text
//! markers:   P1@0        P2@30000            P3@75000      end@90000
//! phases:    |--30000----|-------45000-------|----15000----|
//! ```
//!
//! A phase ends where the next marker starts, and the final phase ends with
//! the pull. A marker logged at the same offset as its successor yields a
//! zero-length phase, which is dropped.

use chrono::{DateTime, Utc};
use raidprog_core::{
    BossId, LookupError, MarkerOffsetBasis, PhaseCatalog, PhaseOrdinal, PullId,
    document::PullDocument,
    time::{at_offset, ms_to_secs},
};
use serde::Serialize;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ReconstructError {
    Lookup(LookupError),
    #[display("phase markers of pull {pull} go backwards at ordinal {ordinal}")]
    MarkersOutOfOrder { pull: PullId, ordinal: PhaseOrdinal },
    #[display("pull {pull} has offsets outside the representable range")]
    OffsetOverflow { pull: PullId },
}

/// A named phase interval within one pull.
///
/// Offsets are relative to the session start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructedPhase {
    pub ordinal: PhaseOrdinal,
    /// Position of this phase in the boss's phase catalog
    pub catalog_index: usize,
    pub name: String,
    pub start_offset_ms: i64,
    pub end_offset_ms: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ReconstructedPhase {
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.end_offset_ms.saturating_sub(self.start_offset_ms)
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        ms_to_secs(self.duration_ms())
    }
}

/// A pull with its derived fields populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructedPull {
    pub id: PullId,
    pub boss: BossId,
    pub zone_name: String,
    pub kill: bool,
    pub start_offset_ms: i64,
    pub end_offset_ms: i64,
    pub combat_time_ms: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Catalog index of the phase the pull ended in
    pub end_phase_index: usize,
    pub end_phase_name: String,
    /// Boss health remaining in the final phase, in percent
    pub end_phase_percent: f64,
    /// Progress remaining through the whole encounter, in percent
    pub end_fight_percent: f64,
    pub phases: Vec<ReconstructedPhase>,
    /// Share of the session's combat time spent in this pull
    pub weight: f64,
}

impl ReconstructedPull {
    #[must_use]
    pub fn combat_secs(&self) -> f64 {
        ms_to_secs(self.combat_time_ms)
    }

    #[must_use]
    pub fn phase(&self, ordinal: PhaseOrdinal) -> Option<&ReconstructedPhase> {
        self.phases.iter().find(|p| p.ordinal == ordinal)
    }

    /// Whether `ordinal` is the last phase the pull reached.
    #[must_use]
    pub fn is_final_phase(&self, ordinal: PhaseOrdinal) -> bool {
        self.phases.last().is_some_and(|p| p.ordinal == ordinal)
    }
}

/// Reconstructs the phase intervals and derived fields of one pull.
///
/// The returned pull has a weight of zero; weights depend on the whole
/// session and are assigned by [`crate::session`].
pub fn reconstruct_pull(
    pull: &PullDocument,
    catalog: &PhaseCatalog,
    session_start: DateTime<Utc>,
    basis: MarkerOffsetBasis,
) -> Result<ReconstructedPull, ReconstructError> {
    let boss = pull.boss_id;
    let end_phase_name = catalog
        .phase_name(boss, pull.last_phase_absolute_index)?
        .to_owned();

    let overflow = || ReconstructError::OffsetOverflow { pull: pull.id };
    let combat_time_ms = pull.combat_time_ms().ok_or_else(overflow)?;
    let marker_start = |offset_ms: i64| match basis {
        MarkerOffsetBasis::PullRelative => pull
            .start_offset_ms
            .checked_add(offset_ms)
            .ok_or_else(overflow),
        MarkerOffsetBasis::ReportRelative => Ok(offset_ms),
    };

    let mut phases = Vec::with_capacity(pull.phase_markers.len());
    for (i, marker) in pull.phase_markers.iter().enumerate() {
        let name = catalog.phase_name_for_ordinal(boss, marker.ordinal_id)?;
        let catalog_index = marker
            .ordinal_id
            .catalog_index()
            .ok_or(LookupError::InvalidOrdinal {
                boss,
                ordinal: marker.ordinal_id,
            })?;
        let start_offset_ms = marker_start(marker.start_offset_ms)?;
        let end_offset_ms = match pull.phase_markers.get(i + 1) {
            Some(next) => marker_start(next.start_offset_ms)?,
            None => pull.end_offset_ms,
        };

        match end_offset_ms
            .checked_sub(start_offset_ms)
            .ok_or_else(overflow)?
        {
            0 => continue,
            d if d < 0 => {
                return Err(ReconstructError::MarkersOutOfOrder {
                    pull: pull.id,
                    ordinal: marker.ordinal_id,
                });
            }
            _ => {}
        }

        phases.push(ReconstructedPhase {
            ordinal: marker.ordinal_id,
            catalog_index,
            name: name.to_owned(),
            start_offset_ms,
            end_offset_ms,
            start_time: at_offset(session_start, start_offset_ms),
            end_time: at_offset(session_start, end_offset_ms),
        });
    }

    Ok(ReconstructedPull {
        id: pull.id,
        boss,
        zone_name: pull.zone_name.clone(),
        kill: pull.kill,
        start_offset_ms: pull.start_offset_ms,
        end_offset_ms: pull.end_offset_ms,
        combat_time_ms,
        start_time: at_offset(session_start, pull.start_offset_ms),
        end_time: at_offset(session_start, pull.end_offset_ms),
        end_phase_index: pull.last_phase_absolute_index,
        end_phase_name,
        end_phase_percent: clamp_percent(pull.boss_percent_remaining),
        end_fight_percent: clamp_percent(pull.fight_percent_remaining),
        phases,
        weight: 0.0,
    })
}

#[expect(clippy::cast_precision_loss)]
fn clamp_percent(raw: i64) -> f64 {
    raw.clamp(0, 100) as f64
}
