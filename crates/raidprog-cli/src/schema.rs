use raidprog_core::document::{DamageTableRecord, SessionDocument};
use serde::{Deserialize, Serialize};

/// One downloaded session with the damage tables fetched for it.
///
/// ```json
/// {
///   "session": { "title": "dsr prog #3", "startTimestamp": 1667412000000, ... },
///   "damageTables": [{ "pullId": 1, "phaseId": 1, "table": { "totalTimeMs": 30000, ... } }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBundle {
    pub session: SessionDocument,
    #[serde(default)]
    pub damage_tables: Vec<DamageTableRecord>,
}
