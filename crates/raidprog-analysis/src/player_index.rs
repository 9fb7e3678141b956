//! Per-player damage observations.
//!
//! Indexing happens in two steps:
//!
//! 1. [`materialize_observations`] turns raw damage tables into immutable
//!    [`DamageObservation`]s, resolving each row against the session's
//!    roster and reconstructed phases.
//! 2. [`PlayerIndex::from_observations`] folds those observations into
//!    per-player maps keyed by `(pull, phase)`, plus the reverse
//!    phase-to-player map.
//!
//! The fold does not depend on the order tables were fetched in, and both
//! steps are plain functions of their inputs.

use std::collections::{BTreeMap, BTreeSet};

use raidprog_core::{
    Diagnostic, JobTable, LookupError, PhaseOrdinal, PlayerGuid, PlayerIdentity, PullId,
    document::DamageTableRecord,
    time::ms_to_secs,
};
use serde::Serialize;

use crate::session::{Player, Session};

/// One player's damage in one phase of one pull.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageObservation {
    pub guid: PlayerGuid,
    pub pull: PullId,
    pub phase: PhaseOrdinal,
    pub phase_name: String,
    pub phase_index: usize,
    pub phase_duration_ms: i64,
    /// The phase was the last one the pull reached
    pub is_final_phase: bool,
    pub total_damage: f64,
    pub total_raid_throughput: f64,
    pub active_time_ms: i64,
    /// Length of the window the damage table covers
    pub table_total_ms: i64,
}

impl DamageObservation {
    #[must_use]
    pub fn phase_secs(&self) -> f64 {
        ms_to_secs(self.phase_duration_ms)
    }

    /// Raw value of `metric` for this phase.
    #[must_use]
    pub fn total(&self, metric: ThroughputMetric) -> f64 {
        match metric {
            ThroughputMetric::RaidThroughput => self.total_raid_throughput,
            ThroughputMetric::Damage => self.total_damage,
        }
    }

    /// `metric` per second of phase time.
    #[must_use]
    pub fn rate(&self, metric: ThroughputMetric) -> f64 {
        self.total(metric) / self.phase_secs()
    }

    /// Fraction of the table window the player was active.
    #[must_use]
    pub fn active_fraction(&self) -> f64 {
        ms_to_secs(self.active_time_ms) / ms_to_secs(self.table_total_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThroughputMetric {
    /// Damage with support contributions credited to the supporter
    #[default]
    RaidThroughput,
    /// Raw damage done
    Damage,
}

/// Observations extracted from a session's damage tables.
#[derive(Debug, Clone, Default)]
pub struct ObservationSet {
    pub observations: Vec<DamageObservation>,
    /// Rows dropped because their guid is not a player on the roster
    pub non_player_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves damage-table rows against the session's roster and phases.
///
/// Rows for entities not on the roster (pets, limit breaks, enemies) are
/// dropped silently. A table whose pull or phase did not survive
/// reconstruction is skipped with a diagnostic.
#[must_use]
pub fn materialize_observations(session: &Session, tables: &[DamageTableRecord]) -> ObservationSet {
    let mut set = ObservationSet::default();
    let roster = session.roster.iter().map(|p| p.guid).collect::<BTreeSet<_>>();

    for record in tables {
        let resolved = session
            .pull(record.pull_id)
            .ok_or(LookupError::UnknownPull {
                pull: record.pull_id,
            })
            .and_then(|pull| {
                pull.phase(record.phase_id)
                    .map(|phase| (pull, phase))
                    .ok_or(LookupError::UnknownPhase {
                        pull: record.pull_id,
                        ordinal: record.phase_id,
                    })
            });
        let (pull, phase) = match resolved {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(session = %session.title, "skipping damage table: {err}");
                set.diagnostics
                    .push(Diagnostic::pull(&session.title, record.pull_id, &err));
                continue;
            }
        };

        for entry in &record.table.entries {
            if !roster.contains(&entry.guid) {
                set.non_player_rows += 1;
                continue;
            }
            set.observations.push(DamageObservation {
                guid: entry.guid,
                pull: pull.id,
                phase: phase.ordinal,
                phase_name: phase.name.clone(),
                phase_index: phase.catalog_index,
                phase_duration_ms: phase.duration_ms(),
                is_final_phase: pull.is_final_phase(phase.ordinal),
                total_damage: entry.total_damage,
                total_raid_throughput: entry.total_raid_throughput,
                active_time_ms: entry.active_time_ms,
                table_total_ms: record.table.total_time_ms,
            });
        }
    }

    tracing::debug!(
        session = %session.title,
        observations = set.observations.len(),
        non_player_rows = set.non_player_rows,
        "materialized damage observations"
    );
    set
}

/// A player and every observation attached to them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player: Player,
    pub entries: BTreeMap<(PullId, PhaseOrdinal), DamageObservation>,
}

impl PlayerRecord {
    /// Observations for one pull, in phase order.
    pub fn pull_entries(&self, pull: PullId) -> impl Iterator<Item = &DamageObservation> {
        self.entries
            .range((pull, PhaseOrdinal(0))..=(pull, PhaseOrdinal(u32::MAX)))
            .map(|(_, obs)| obs)
    }

    /// Duration-weighted rate over a whole pull.
    ///
    /// This is the sum of the raw totals divided by the sum of the phase
    /// durations, not the mean of the per-phase rates. Returns `0.0` when the
    /// player has no observation in the pull.
    #[must_use]
    pub fn pull_rate(&self, pull: PullId, metric: ThroughputMetric) -> f64 {
        let (total, secs) = self
            .pull_entries(pull)
            .fold((0.0, 0.0), |(total, secs), obs| {
                (total + obs.total(metric), secs + obs.phase_secs())
            });
        if secs > 0.0 { total / secs } else { 0.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerIndex {
    players: BTreeMap<PlayerGuid, PlayerRecord>,
    by_phase: BTreeMap<(PullId, PhaseOrdinal), BTreeSet<PlayerGuid>>,
}

impl PlayerIndex {
    /// Folds observations into per-player maps.
    ///
    /// Every roster member gets a record, observed or not. Observations for
    /// guids outside `roster` are ignored. If two observations share a
    /// player, pull and phase, the later one replaces the earlier.
    pub fn from_observations<I>(roster: &[Player], observations: I) -> Self
    where
        I: IntoIterator<Item = DamageObservation>,
    {
        let mut players = roster
            .iter()
            .map(|p| {
                (
                    p.guid,
                    PlayerRecord {
                        player: p.clone(),
                        entries: BTreeMap::new(),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        let mut by_phase = BTreeMap::<_, BTreeSet<_>>::new();

        for obs in observations {
            let Some(record) = players.get_mut(&obs.guid) else {
                continue;
            };
            let key = (obs.pull, obs.phase);
            by_phase.entry(key).or_default().insert(obs.guid);
            record.entries.insert(key, obs);
        }

        Self { players, by_phase }
    }

    /// Materializes observations from `tables` and indexes them.
    #[must_use]
    pub fn build(session: &Session, tables: &[DamageTableRecord]) -> (Self, ObservationSet) {
        let mut set = materialize_observations(session, tables);
        let index = Self::from_observations(&session.roster, std::mem::take(&mut set.observations));
        (index, set)
    }

    #[must_use]
    pub fn player(&self, guid: PlayerGuid) -> Option<&PlayerRecord> {
        self.players.get(&guid)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.values()
    }

    /// Players with an observation in the given phase of the given pull.
    pub fn players_in_phase(
        &self,
        pull: PullId,
        phase: PhaseOrdinal,
    ) -> impl Iterator<Item = &PlayerRecord> {
        self.by_phase
            .get(&(pull, phase))
            .into_iter()
            .flatten()
            .filter_map(|guid| self.players.get(guid))
    }

    /// Per-pull aggregate rate for every player in `session`.
    ///
    /// Rows are sorted by descending job rank so that, stacked bottom-up,
    /// tanks come first. Columns follow the session's pull order.
    #[must_use]
    pub fn per_pull_throughput(
        &self,
        session: &Session,
        jobs: &JobTable,
        metric: ThroughputMetric,
    ) -> PerPullPlayerThroughput {
        let mut records = self.players.values().collect::<Vec<_>>();
        records.sort_by(|a, b| {
            jobs.rank(&a.player.job)
                .cmp(&jobs.rank(&b.player.job))
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        records.reverse();

        let rows = records
            .into_iter()
            .map(|record| PlayerThroughputRow {
                player: record.player.identity(),
                values: session
                    .pulls
                    .iter()
                    .map(|pull| record.pull_rate(pull.id, metric))
                    .collect(),
            })
            .collect();

        PerPullPlayerThroughput {
            metric,
            pulls: session
                .pulls
                .iter()
                .map(|p| PullColumn {
                    pull: p.id,
                    end_phase: p.end_phase_name.clone(),
                })
                .collect(),
            rows,
        }
    }
}

/// Player × pull table of aggregate throughput.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerPullPlayerThroughput {
    pub metric: ThroughputMetric,
    pub pulls: Vec<PullColumn>,
    pub rows: Vec<PlayerThroughputRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullColumn {
    pub pull: PullId,
    pub end_phase: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerThroughputRow {
    pub player: PlayerIdentity,
    /// One value per entry of [`PerPullPlayerThroughput::pulls`]
    pub values: Vec<f64>,
}
