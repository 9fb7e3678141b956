//! Input documents produced by the log ingestion layer.
//!
//! These mirror the JSON the ingestion layer writes after fetching a session
//! from the remote log service. All offsets and durations are integer
//! milliseconds; timestamps are milliseconds since the Unix epoch.
//!
//! ```json
//! {
//!   "title": "ultimate prog #12",
//!   "startTimestamp": 1667412000000,
//!   "phaseCatalog": [{ "bossId": 1065, "phaseNames": ["P1", "P2"] }],
//!   "roster": [{ "id": 3, "guid": 1001, "name": "Aria", "job": "Paladin", "server": "Twintania" }],
//!   "pulls": [{
//!     "id": 1, "bossId": 1065, "zoneName": "Dragonsong", "kill": false,
//!     "startOffsetMs": 0, "endOffsetMs": 90000,
//!     "lastPhaseAbsoluteIndex": 1, "lastPhaseDisplayIndex": 2,
//!     "phaseMarkers": [{ "ordinalId": 1, "startOffsetMs": 0 }, { "ordinalId": 2, "startOffsetMs": 30000 }],
//!     "bossPercentRemaining": 42, "fightPercentRemaining": 71
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::ids::{BossId, PhaseOrdinal, PlayerGuid, PullId};

/// One logged practice session.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    /// Free-form title; the progression tag is its first `#`-separated segment
    pub title: String,
    /// Session start, milliseconds since the Unix epoch
    pub start_timestamp: i64,
    /// Pulls in log order (may contain trash and re-logged duplicates)
    #[serde(default)]
    pub pulls: Vec<PullDocument>,
    /// Boss id to ordered phase names; absent for sessions the service could not phase
    #[serde(default)]
    pub phase_catalog: Option<Vec<PhaseCatalogDocument>>,
    /// Every combat entity the service saw, players and otherwise
    #[serde(default)]
    pub roster: Vec<RosterEntryDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseCatalogDocument {
    pub boss_id: BossId,
    pub phase_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntryDocument {
    pub id: u32,
    pub guid: PlayerGuid,
    pub name: String,
    pub job: String,
    /// Empty for pets, limit breaks and other non-player entities
    #[serde(default)]
    pub server: String,
}

impl RosterEntryDocument {
    #[must_use]
    pub fn is_player(&self) -> bool {
        !self.server.is_empty()
    }
}

/// One attempt at an encounter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullDocument {
    pub id: PullId,
    pub boss_id: BossId,
    #[serde(default)]
    pub zone_name: String,
    #[serde(default)]
    pub kill: bool,
    /// Pull start relative to session start
    pub start_offset_ms: i64,
    /// Pull end relative to session start
    pub end_offset_ms: i64,
    /// Combat time reported by the service; `None` or `0` means "use end - start"
    #[serde(default)]
    pub explicit_combat_time_ms: Option<i64>,
    /// 0-based catalog index of the phase the pull ended in
    #[serde(default)]
    pub last_phase_absolute_index: usize,
    /// Display ordinal of the final phase (intermissions excluded)
    #[serde(default)]
    pub last_phase_display_index: usize,
    #[serde(default)]
    pub phase_markers: Vec<PhaseMarkerDocument>,
    #[serde(default)]
    pub boss_percent_remaining: i64,
    #[serde(default)]
    pub fight_percent_remaining: i64,
}

impl PullDocument {
    /// Combat time in milliseconds, preferring the service's explicit value.
    ///
    /// Returns `None` if the offsets are too far apart to subtract.
    #[must_use]
    pub fn combat_time_ms(&self) -> Option<i64> {
        match self.explicit_combat_time_ms {
            Some(ms) if ms != 0 => Some(ms),
            _ => self.end_offset_ms.checked_sub(self.start_offset_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseMarkerDocument {
    pub ordinal_id: PhaseOrdinal,
    pub start_offset_ms: i64,
}

/// A damage table together with the pull and phase it was fetched for.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageTableRecord {
    pub pull_id: PullId,
    pub phase_id: PhaseOrdinal,
    pub table: DamageTableDocument,
}

/// Damage-done table for one phase of one pull.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageTableDocument {
    pub total_time_ms: i64,
    #[serde(default)]
    pub downtime_ms: i64,
    #[serde(default)]
    pub entries: Vec<DamageEntryDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageEntryDocument {
    pub guid: PlayerGuid,
    pub name: String,
    pub total_damage: f64,
    pub total_raid_throughput: f64,
    #[serde(default)]
    pub throughput_taken: f64,
    #[serde(default)]
    pub throughput_given: f64,
    #[serde(default)]
    pub active_time_ms: i64,
}
