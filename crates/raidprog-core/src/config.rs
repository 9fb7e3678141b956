//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "enrage_tolerance_secs": 5.0,
//!   "confidence_z": 0.95,
//!   "tag_separator": "#",
//!   "marker_offset_basis": "pull_relative",
//!   "enrage": [{ "boss_id": 1065, "phase": "P1: Adelphel, Grinnaux and Charibert", "seconds": 171.0 }],
//!   "jobs": ["Warrior", "Paladin"]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{EnrageTable, JobTable},
    ids::BossId,
};

/// What phase-marker start offsets are measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerOffsetBasis {
    /// Offsets count from the pull's own start.
    #[default]
    PullRelative,
    /// Offsets count from the session start, like pull offsets do.
    ReportRelative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How far a final phase may deviate from its enrage reference and still count
    pub enrage_tolerance_secs: f64,
    /// Multiplier applied to the standard error for throughput bounds
    pub confidence_z: f64,
    /// Separator between the progression tag and the rest of a session title
    pub tag_separator: String,
    pub marker_offset_basis: MarkerOffsetBasis,
    pub enrage: Vec<EnrageEntry>,
    pub jobs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrageEntry {
    pub boss_id: BossId,
    pub phase: String,
    pub seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enrage_tolerance_secs: 5.0,
            // Matches the multiplier historical reports were produced with.
            confidence_z: 0.95,
            tag_separator: "#".to_owned(),
            marker_offset_basis: MarkerOffsetBasis::default(),
            enrage: vec![],
            jobs: DEFAULT_JOB_ORDER.iter().map(|&j| j.to_owned()).collect(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn enrage_table(&self) -> EnrageTable {
        EnrageTable::new(
            self.enrage
                .iter()
                .map(|e| (e.boss_id, e.phase.clone(), e.seconds)),
        )
    }

    #[must_use]
    pub fn job_table(&self) -> JobTable {
        JobTable::new(self.jobs.iter().cloned())
    }
}

/// Tanks, healers, melee, ranged, casters.
const DEFAULT_JOB_ORDER: &[&str] = &[
    "Warrior",
    "Paladin",
    "DarkKnight",
    "Gunbreaker",
    "WhiteMage",
    "Astrologian",
    "Sage",
    "Scholar",
    "Samurai",
    "Ninja",
    "Dragoon",
    "Monk",
    "Reaper",
    "Bard",
    "Dancer",
    "Machinist",
    "Summoner",
    "RedMage",
    "BlackMage",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.confidence_z, 0.95);
        assert_eq!(config.enrage_tolerance_secs, 5.0);
        assert_eq!(config.marker_offset_basis, MarkerOffsetBasis::PullRelative);
    }

    #[test]
    fn test_partial_override() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "confidence_z": 1.96,
                "marker_offset_basis": "report_relative",
                "enrage": [{ "boss_id": 1065, "phase": "P1", "seconds": 171.0 }]
            }"#,
        )
        .unwrap();
        assert_eq!(config.confidence_z, 1.96);
        assert_eq!(config.tag_separator, "#");
        assert_eq!(
            config.marker_offset_basis,
            MarkerOffsetBasis::ReportRelative
        );
        assert_eq!(config.enrage_table().get(BossId(1065), "P1"), Ok(171.0));
    }

    #[test]
    fn test_default_job_order() {
        let jobs = EngineConfig::default().job_table();
        assert!(jobs.rank("Warrior") < jobs.rank("WhiteMage"));
        assert!(jobs.rank("WhiteMage") < jobs.rank("BlackMage"));
    }
}
