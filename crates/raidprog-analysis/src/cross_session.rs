//! Cross-session per-player, per-phase throughput statistics.
//!
//! Observations from every session of a progression group are pooled by
//! player identity and phase. An observation only counts if it reflects a
//! full phase of damage output:
//!
//! - the phase was not the last one the pull reached, or
//! - the phase ran to within the configured tolerance of its enrage
//!   reference duration.
//!
//! This drops phases cut short by wipes unrelated to damage (disconnects,
//! resets), which would otherwise drag the mean down. Each qualifying bucket
//! reports a mean and a confidence half-width of `z * s / sqrt(n)`.

use std::collections::{BTreeMap, BTreeSet};

use raidprog_core::{
    BossId, Diagnostic, DiagnosticScope, EngineConfig, EnrageTable, LookupError, PlayerIdentity,
    StatisticsError,
};
use raidprog_stats::{confidence::ConfidenceBound, descriptive::DescriptiveStats};
use serde::Serialize;

use crate::{
    player_index::{DamageObservation, PlayerIndex, ThroughputMetric},
    session::Session,
};

/// A session paired with its player index.
#[derive(Debug, Clone, Copy)]
pub struct SessionPerformance<'a> {
    pub session: &'a Session,
    pub index: &'a PlayerIndex,
}

/// Throughput distribution of one player in one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseThroughputStats {
    pub player: PlayerIdentity,
    pub boss: BossId,
    pub phase_index: usize,
    pub phase: String,
    pub sample_count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub half_width: f64,
    pub interval_width: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossSessionStats {
    /// Ordered by player, then catalog phase order
    pub buckets: Vec<PhaseThroughputStats>,
    /// Observations that failed the validity filter
    pub excluded_observations: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CrossSessionStats {
    pub fn for_player<'a>(
        &'a self,
        player: &PlayerIdentity,
    ) -> impl Iterator<Item = &'a PhaseThroughputStats> {
        self.buckets.iter().filter(move |b| &b.player == player)
    }
}

#[derive(Debug, Clone)]
pub struct CrossSessionStatistics {
    enrage: EnrageTable,
    tolerance_secs: f64,
    z: f64,
    metric: ThroughputMetric,
}

type BucketKey = (PlayerIdentity, BossId, usize);

impl CrossSessionStatistics {
    #[must_use]
    pub fn new(enrage: EnrageTable, tolerance_secs: f64, z: f64) -> Self {
        Self {
            enrage,
            tolerance_secs,
            z,
            metric: ThroughputMetric::RaidThroughput,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.enrage_table(),
            config.enrage_tolerance_secs,
            config.confidence_z,
        )
    }

    #[must_use]
    pub fn with_metric(self, metric: ThroughputMetric) -> Self {
        Self { metric, ..self }
    }

    /// Whether an observation reflects a full phase of output.
    ///
    /// Fails if the observation's phase ended its pull and has no enrage
    /// reference to compare against.
    pub fn qualifies(&self, boss: BossId, obs: &DamageObservation) -> Result<bool, LookupError> {
        if !obs.is_final_phase {
            return Ok(true);
        }
        let reference = self.enrage.get(boss, &obs.phase_name)?;
        Ok((obs.phase_secs() - reference).abs() <= self.tolerance_secs)
    }

    /// Pools observations across `sessions` and computes per-bucket bounds.
    ///
    /// When `identities` is given, only those players are considered.
    /// Buckets without a qualifying observation are omitted, and a bucket
    /// whose statistics cannot be computed is reported and skipped without
    /// affecting the others.
    #[must_use]
    pub fn compute(
        &self,
        sessions: &[SessionPerformance<'_>],
        identities: Option<&BTreeSet<PlayerIdentity>>,
    ) -> CrossSessionStats {
        let mut samples = BTreeMap::<BucketKey, (String, Vec<f64>)>::new();
        let mut excluded_observations = 0;
        let mut diagnostics = vec![];
        let mut reported = BTreeSet::new();

        for perf in sessions {
            let boss = perf.session.boss;
            for record in perf.index.players() {
                let identity = record.player.identity();
                if identities.is_some_and(|ids| !ids.contains(&identity)) {
                    continue;
                }
                for obs in record.entries.values() {
                    match self.qualifies(boss, obs) {
                        Ok(true) => {}
                        Ok(false) => {
                            excluded_observations += 1;
                            continue;
                        }
                        Err(err) => {
                            excluded_observations += 1;
                            if reported.insert((perf.session.title.clone(), obs.phase_index)) {
                                tracing::warn!(session = %perf.session.title, "{err}");
                                diagnostics.push(Diagnostic::session(&perf.session.title, &err));
                            }
                            continue;
                        }
                    }
                    samples
                        .entry((identity.clone(), boss, obs.phase_index))
                        .or_insert_with(|| (obs.phase_name.clone(), vec![]))
                        .1
                        .push(obs.rate(self.metric));
                }
            }
        }

        let mut buckets = Vec::with_capacity(samples.len());
        for ((player, boss, phase_index), (phase, values)) in samples {
            match self.bucket(&player, &phase, &values) {
                Ok(Some(bound)) => buckets.push(PhaseThroughputStats {
                    player,
                    boss,
                    phase_index,
                    phase,
                    sample_count: bound.sample_count,
                    mean: bound.mean,
                    std_dev: bound.std_dev,
                    half_width: bound.half_width,
                    interval_width: bound.interval_width,
                }),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("omitting throughput bucket: {err}");
                    diagnostics.push(Diagnostic::new(
                        DiagnosticScope::Player {
                            player: player.clone(),
                            phase: phase.clone(),
                        },
                        &err,
                    ));
                }
            }
        }

        tracing::debug!(
            buckets = buckets.len(),
            excluded_observations,
            "computed cross-session throughput"
        );
        CrossSessionStats {
            buckets,
            excluded_observations,
            diagnostics,
        }
    }

    fn bucket(
        &self,
        player: &PlayerIdentity,
        phase: &str,
        values: &[f64],
    ) -> Result<Option<ConfidenceBound>, StatisticsError> {
        let non_finite = || StatisticsError::NonFinite {
            player: player.clone(),
            phase: phase.to_owned(),
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(non_finite());
        }
        let Some(stats) = DescriptiveStats::new(values.iter().copied()) else {
            return Ok(None);
        };
        if !stats.is_finite() {
            return Err(non_finite());
        }
        Ok(Some(ConfidenceBound::from_stats(&stats, self.z)))
    }
}

#[cfg(test)]
mod tests {
    use raidprog_core::{PlayerGuid, PullId, document::DamageTableRecord};

    use super::*;
    use crate::test_util::{BOSS, damage_table, loaded_session, pull_with_markers, session_doc};

    // P1 enrage 60s, P2 enrage 120s
    fn stats() -> CrossSessionStatistics {
        CrossSessionStatistics::new(
            EnrageTable::new([(BOSS, "P1".to_owned(), 60.0), (BOSS, "P2".to_owned(), 120.0)]),
            5.0,
            0.95,
        )
    }

    fn paladin() -> PlayerIdentity {
        PlayerIdentity {
            name: "Aria".to_owned(),
            job: "Paladin".to_owned(),
        }
    }

    struct Fixture {
        session: Session,
        index: PlayerIndex,
    }

    impl Fixture {
        fn new(pulls: Vec<raidprog_core::document::PullDocument>, tables: &[DamageTableRecord]) -> Self {
            let session = loaded_session(session_doc(pulls));
            let (index, _) = PlayerIndex::build(&session, tables);
            Self { session, index }
        }

        fn perf(&self) -> SessionPerformance<'_> {
            SessionPerformance {
                session: &self.session,
                index: &self.index,
            }
        }
    }

    fn bucket<'a>(stats: &'a CrossSessionStats, phase: &str) -> Option<&'a PhaseThroughputStats> {
        stats
            .for_player(&paladin())
            .find(|b| b.phase == phase)
    }

    #[test]
    fn test_non_final_phase_always_counts() {
        // pull 1: P1 for 30s, then P2 until a wipe after 20s
        let fixture = Fixture::new(
            vec![pull_with_markers(1, 0, 50_000, &[(1, 0), (2, 30_000)])],
            &[
                damage_table(1, 1, &[(1001, 0.0, 30_000.0)]),
                damage_table(1, 2, &[(1001, 0.0, 20_000.0)]),
            ],
        );
        let result = stats().compute(&[fixture.perf()], None);
        let p1 = bucket(&result, "P1").unwrap();
        assert_eq!(p1.sample_count, 1);
        assert_eq!(p1.mean, 1_000.0);
        assert!(bucket(&result, "P2").is_none());
        assert_eq!(result.excluded_observations, 1);
    }

    #[test]
    fn test_final_phase_near_enrage_counts() {
        // P2 runs 117s against a 120s enrage
        let fixture = Fixture::new(
            vec![pull_with_markers(1, 0, 147_000, &[(1, 0), (2, 30_000)])],
            &[damage_table(1, 2, &[(1001, 0.0, 234_000.0)])],
        );
        let result = stats().compute(&[fixture.perf()], None);
        let p2 = bucket(&result, "P2").unwrap();
        assert_eq!(p2.sample_count, 1);
        assert_eq!(p2.mean, 2_000.0);
        assert_eq!(result.excluded_observations, 0);
    }

    #[test]
    fn test_final_phase_far_from_enrage_excluded() {
        // P2 runs 126s against a 120s enrage
        let fixture = Fixture::new(
            vec![pull_with_markers(1, 0, 156_000, &[(1, 0), (2, 30_000)])],
            &[damage_table(1, 2, &[(1001, 0.0, 252_000.0)])],
        );
        let result = stats().compute(&[fixture.perf()], None);
        assert!(bucket(&result, "P2").is_none());
        assert_eq!(result.excluded_observations, 1);
    }

    #[test]
    fn test_pools_across_sessions() {
        let a = Fixture::new(
            vec![pull_with_markers(1, 0, 50_000, &[(1, 0), (2, 30_000)])],
            &[damage_table(1, 1, &[(1001, 0.0, 30_000.0)])],
        );
        let b = Fixture::new(
            vec![pull_with_markers(1, 0, 50_000, &[(1, 0), (2, 30_000)])],
            &[damage_table(1, 1, &[(1001, 0.0, 36_000.0)])],
        );
        let result = stats().compute(&[a.perf(), b.perf()], None);
        let p1 = bucket(&result, "P1").unwrap();
        assert_eq!(p1.sample_count, 2);
        assert_eq!(p1.mean, 1_100.0);
        // values 1000 and 1200: s = sqrt(20000), half = 0.95 * s / sqrt(2)
        let half = 0.95 * 20_000.0_f64.sqrt() / 2.0_f64.sqrt();
        assert!((p1.half_width - half).abs() < 1e-9);
        assert!((p1.interval_width - 2.0 * half).abs() < 1e-9);
    }

    #[test]
    fn test_identity_filter() {
        let fixture = Fixture::new(
            vec![pull_with_markers(1, 0, 50_000, &[(1, 0), (2, 30_000)])],
            &[damage_table(1, 1, &[(1001, 0.0, 30_000.0), (1002, 0.0, 9_000.0)])],
        );
        let only = BTreeSet::from([paladin()]);
        let result = stats().compute(&[fixture.perf()], Some(&only));
        assert!(result.buckets.iter().all(|b| b.player == paladin()));
        assert_eq!(result.buckets.len(), 1);
    }

    #[test]
    fn test_missing_enrage_reference_excludes_final_phase() {
        let fixture = Fixture::new(
            vec![pull_with_markers(1, 0, 50_000, &[(1, 0), (3, 30_000)])],
            &[
                damage_table(1, 1, &[(1001, 0.0, 30_000.0)]),
                damage_table(1, 3, &[(1001, 0.0, 20_000.0), (1002, 0.0, 20_000.0)]),
            ],
        );
        let result = stats().compute(&[fixture.perf()], None);
        assert!(bucket(&result, "P1").is_some());
        assert!(bucket(&result, "P3").is_none());
        assert_eq!(result.excluded_observations, 2);
        // reported once per session and phase
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_bad_bucket_isolated() {
        let mut fixture = Fixture::new(
            vec![pull_with_markers(1, 0, 50_000, &[(1, 0), (2, 30_000)])],
            &[damage_table(1, 1, &[(1001, 0.0, 30_000.0), (1002, 0.0, 9_000.0)])],
        );
        // corrupt the healer's observation only
        let healer_obs = materialize_nan(&fixture, PlayerGuid(1002));
        fixture.index = PlayerIndex::from_observations(&fixture.session.roster, healer_obs);
        let result = stats().compute(&[fixture.perf()], None);
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].player, paladin());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].scope,
            DiagnosticScope::Player { .. }
        ));
    }

    fn materialize_nan(fixture: &Fixture, guid: PlayerGuid) -> Vec<DamageObservation> {
        fixture
            .index
            .players()
            .flat_map(|r| r.entries.values().cloned())
            .map(|mut obs| {
                if obs.guid == guid {
                    obs.total_raid_throughput = f64::NAN;
                }
                obs
            })
            .collect()
    }

    #[test]
    fn test_damage_metric() {
        let fixture = Fixture::new(
            vec![pull_with_markers(1, 0, 50_000, &[(1, 0), (2, 30_000)])],
            &[damage_table(1, 1, &[(1001, 27_000.0, 30_000.0)])],
        );
        let result = stats()
            .with_metric(ThroughputMetric::Damage)
            .compute(&[fixture.perf()], None);
        assert_eq!(bucket(&result, "P1").unwrap().mean, 900.0);
    }

    #[test]
    fn test_deterministic() {
        let fixture = Fixture::new(
            vec![
                pull_with_markers(1, 0, 50_000, &[(1, 0), (2, 30_000)]),
                pull_with_markers(2, 60_000, 110_000, &[(1, 0), (2, 30_000)]),
            ],
            &[
                damage_table(1, 1, &[(1001, 0.0, 30_000.0)]),
                damage_table(2, 1, &[(1001, 0.0, 33_000.0)]),
            ],
        );
        let a = stats().compute(&[fixture.perf()], None);
        let b = stats().compute(&[fixture.perf()], None);
        assert_eq!(a, b);
        assert_eq!(fixture.session.pull(PullId(2)).map(|p| p.phases.len()), Some(2));
    }
}
