//! Per-session summary statistics.
//!
//! All statistics are pure functions of the reconstructed pulls: computing a
//! summary twice on the same input yields the same value.
//!
//! Per-phase outputs are ordered by the phase's position in the boss's phase
//! catalog. Stacked and cumulative renderings depend on this order, so it
//! never follows first occurrence or frequency.

use std::collections::BTreeMap;

use raidprog_stats::rounding::{MidpointRounding, round_to};
use serde::Serialize;

use crate::reconstruct::ReconstructedPull;

/// Pulls that ended in one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseEndBucket {
    pub phase_index: usize,
    pub phase: String,
    pub count: usize,
    pub total_secs: f64,
    /// Sum of the pulls' weights, i.e. their share of session combat time
    pub weight_share: f64,
}

/// Total time spent in one phase across all pulls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseTime {
    pub phase_index: usize,
    pub phase: String,
    pub total_secs: f64,
}

/// One point of a catalog-ordered cumulative series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub phase: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub pull_count: usize,
    /// Wall time from the first pull's start to the last pull's end
    pub total_time_secs: f64,
    pub time_in_combat_secs: f64,
    pub time_out_of_combat_secs: f64,
    pub simple_average_secs: f64,
    pub weighted_average_secs: f64,
    pub longest_pull_secs: f64,
    pub pulls_ending_in_phase: Vec<PhaseEndBucket>,
    pub time_in_phase: Vec<PhaseTime>,
}

impl SessionSummary {
    /// Computes the summary of a non-empty, weighted set of pulls.
    ///
    /// Returns `None` for an empty slice.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_pulls(pulls: &[ReconstructedPull]) -> Option<Self> {
        let first = pulls.first()?;
        let last = pulls.last()?;

        let pull_count = pulls.len();
        let time_in_combat_secs = pulls.iter().map(ReconstructedPull::combat_secs).sum::<f64>();
        let total_time_secs = (last.end_time - first.start_time).num_milliseconds() as f64 / 1000.0;
        let simple_average_secs = time_in_combat_secs / pull_count as f64;

        let weight_sum = pulls.iter().map(|p| p.weight).sum::<f64>();
        let weighted_average_secs = if weight_sum > 0.0 {
            pulls.iter().map(|p| p.weight * p.combat_secs()).sum::<f64>() / weight_sum
        } else {
            0.0
        };

        let longest_pull_secs = pulls
            .iter()
            .map(ReconstructedPull::combat_secs)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            pull_count,
            total_time_secs,
            time_in_combat_secs,
            time_out_of_combat_secs: total_time_secs - time_in_combat_secs,
            simple_average_secs,
            weighted_average_secs,
            longest_pull_secs,
            pulls_ending_in_phase: pulls_ending_in_phase(pulls),
            time_in_phase: time_in_phase(pulls),
        })
    }

    /// Catalog-ordered cumulative percentage of combat time by end phase.
    ///
    /// Each phase's share is rounded to two decimals (ties toward positive
    /// infinity) before being added to the running total, and every running
    /// total is clamped to `[0, 100]` so rounding drift cannot push a 100%
    /// stacked bar past its frame. Phases no pull ended in contribute zero.
    #[must_use]
    pub fn cumulative_end_percentages(&self, phase_names: &[String]) -> Vec<CumulativePoint> {
        let shares = self
            .pulls_ending_in_phase
            .iter()
            .map(|b| (b.phase_index, b.weight_share * 100.0))
            .collect::<BTreeMap<_, _>>();

        let mut running = 0.0;
        phase_names
            .iter()
            .enumerate()
            .map(|(i, phase)| {
                let share = shares.get(&i).copied().unwrap_or(0.0);
                let share = round_to(share, 2, MidpointRounding::ToPositiveInfinity);
                running = round_to(running + share, 2, MidpointRounding::ToPositiveInfinity)
                    .clamp(0.0, 100.0);
                CumulativePoint {
                    phase: phase.clone(),
                    value: running,
                }
            })
            .collect()
    }

    /// Catalog-ordered cumulative combat seconds by end phase.
    #[must_use]
    pub fn cumulative_end_seconds(&self, phase_names: &[String]) -> Vec<CumulativePoint> {
        let totals = self
            .pulls_ending_in_phase
            .iter()
            .map(|b| (b.phase_index, b.total_secs))
            .collect::<BTreeMap<_, _>>();

        let mut running = 0.0;
        phase_names
            .iter()
            .enumerate()
            .map(|(i, phase)| {
                running += totals.get(&i).copied().unwrap_or(0.0);
                CumulativePoint {
                    phase: phase.clone(),
                    value: running,
                }
            })
            .collect()
    }
}

fn pulls_ending_in_phase(pulls: &[ReconstructedPull]) -> Vec<PhaseEndBucket> {
    let mut buckets = BTreeMap::<usize, PhaseEndBucket>::new();
    for pull in pulls {
        let bucket = buckets
            .entry(pull.end_phase_index)
            .or_insert_with(|| PhaseEndBucket {
                phase_index: pull.end_phase_index,
                phase: pull.end_phase_name.clone(),
                count: 0,
                total_secs: 0.0,
                weight_share: 0.0,
            });
        bucket.count += 1;
        bucket.total_secs += pull.combat_secs();
        bucket.weight_share += pull.weight;
    }
    buckets.into_values().collect()
}

fn time_in_phase(pulls: &[ReconstructedPull]) -> Vec<PhaseTime> {
    let mut totals = BTreeMap::<usize, PhaseTime>::new();
    for phase in pulls.iter().flat_map(|p| &p.phases) {
        totals
            .entry(phase.catalog_index)
            .or_insert_with(|| PhaseTime {
                phase_index: phase.catalog_index,
                phase: phase.name.clone(),
                total_secs: 0.0,
            })
            .total_secs += phase.duration_secs();
    }
    totals.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::assign_weights, test_util::reconstructed};

    fn names() -> Vec<String> {
        ["P1", "P2", "P3", "Intermission", "P4"]
            .iter()
            .map(|&s| s.to_owned())
            .collect()
    }

    fn three_pulls() -> Vec<ReconstructedPull> {
        let mut pulls = vec![
            reconstructed(1, 0, 60_000, &[(1, 0), (2, 30_000)], 1),
            reconstructed(2, 100_000, 190_000, &[(1, 0), (2, 30_000), (3, 75_000)], 2),
            reconstructed(3, 300_000, 345_000, &[(1, 0)], 0),
        ];
        assign_weights(&mut pulls);
        pulls
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(SessionSummary::from_pulls(&[]), None);
    }

    #[test]
    fn test_weighted_average_end_to_end() {
        let summary = SessionSummary::from_pulls(&three_pulls()).unwrap();
        let expected = (60.0_f64.powi(2) + 90.0_f64.powi(2) + 45.0_f64.powi(2)) / 195.0;
        assert!((summary.weighted_average_secs - expected).abs() < 1e-9);
        assert!((summary.weighted_average_secs - 70.3846).abs() < 1e-3);
        assert!((summary.simple_average_secs - 65.0).abs() < 1e-9);
        assert_eq!(summary.longest_pull_secs, 90.0);
        assert_eq!(summary.pull_count, 3);
    }

    #[test]
    fn test_session_timing_totals() {
        let summary = SessionSummary::from_pulls(&three_pulls()).unwrap();
        assert_eq!(summary.total_time_secs, 345.0);
        assert_eq!(summary.time_in_combat_secs, 195.0);
        assert_eq!(summary.time_out_of_combat_secs, 150.0);
    }

    #[test]
    fn test_end_phase_distribution_is_catalog_ordered() {
        let summary = SessionSummary::from_pulls(&three_pulls()).unwrap();
        let phases = summary
            .pulls_ending_in_phase
            .iter()
            .map(|b| b.phase.as_str())
            .collect::<Vec<_>>();
        // first occurrence order would be P2, P3, P1
        assert_eq!(phases, ["P1", "P2", "P3"]);
        let p2 = &summary.pulls_ending_in_phase[1];
        assert_eq!(p2.count, 1);
        assert_eq!(p2.total_secs, 60.0);
        assert!((p2.weight_share - 60.0 / 195.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_in_phase_sums_durations() {
        let summary = SessionSummary::from_pulls(&three_pulls()).unwrap();
        let totals = summary
            .time_in_phase
            .iter()
            .map(|t| (t.phase.as_str(), t.total_secs))
            .collect::<Vec<_>>();
        assert_eq!(totals, [("P1", 105.0), ("P2", 75.0), ("P3", 15.0)]);
    }

    #[test]
    fn test_cumulative_percentages_monotonic_and_bounded() {
        let summary = SessionSummary::from_pulls(&three_pulls()).unwrap();
        let series = summary.cumulative_end_percentages(&names());
        assert_eq!(series.len(), 5);
        assert!(series.windows(2).all(|w| w[0].value <= w[1].value));
        assert!(series.iter().all(|p| (0.0..=100.0).contains(&p.value)));
        // 45/195 = 23.0769..%, 60/195 = 30.7692..%, 90/195 = 46.1538..%
        assert_eq!(series[0].value, 23.08);
        assert_eq!(series[1].value, 53.85);
        assert_eq!(series[2].value, 100.0);
        assert_eq!(series[4].value, 100.0);
    }

    #[test]
    fn test_cumulative_percentages_clamp_rounding_drift() {
        // shares overshoot 100 once summed, later phases must stay pinned at 100
        let summary = SessionSummary {
            pull_count: 4,
            total_time_secs: 0.0,
            time_in_combat_secs: 0.0,
            time_out_of_combat_secs: 0.0,
            simple_average_secs: 0.0,
            weighted_average_secs: 0.0,
            longest_pull_secs: 0.0,
            pulls_ending_in_phase: (0..4)
                .map(|i| PhaseEndBucket {
                    phase_index: i,
                    phase: names()[i].clone(),
                    count: 1,
                    total_secs: 1.0,
                    weight_share: if i == 3 { 0.000_06 } else { 0.34 },
                })
                .collect(),
            time_in_phase: vec![],
        };
        let series = summary.cumulative_end_percentages(&names());
        assert_eq!(series[2].value, 100.0);
        assert_eq!(series[3].value, 100.0);
        assert!(series.iter().all(|p| p.value <= 100.0));
    }

    #[test]
    fn test_cumulative_seconds() {
        let summary = SessionSummary::from_pulls(&three_pulls()).unwrap();
        let series = summary.cumulative_end_seconds(&names());
        let values = series.iter().map(|p| p.value).collect::<Vec<_>>();
        assert_eq!(values, [45.0, 105.0, 195.0, 195.0, 195.0]);
    }

    #[test]
    fn test_idempotent() {
        let pulls = three_pulls();
        let a = SessionSummary::from_pulls(&pulls).unwrap();
        let b = SessionSummary::from_pulls(&pulls).unwrap();
        assert_eq!(a, b);
    }
}
