//! Document builders shared by the unit tests.

use raidprog_core::{
    BossId, EngineConfig, MarkerOffsetBasis, PhaseCatalog, PhaseOrdinal, PlayerGuid, PullId,
    document::{
        DamageEntryDocument, DamageTableDocument, DamageTableRecord, PhaseCatalogDocument,
        PhaseMarkerDocument, PullDocument, RosterEntryDocument, SessionDocument,
    },
    time::timestamp_from_millis,
};

use crate::{
    reconstruct::{ReconstructedPull, reconstruct_pull},
    session::Session,
};

pub const BOSS: BossId = BossId(1065);

const START_MS: i64 = 1_667_412_000_000;

fn catalog_documents() -> Vec<PhaseCatalogDocument> {
    vec![PhaseCatalogDocument {
        boss_id: BOSS,
        phase_names: ["P1", "P2", "P3", "Intermission", "P4"]
            .iter()
            .map(|&s| s.to_owned())
            .collect(),
    }]
}

pub fn catalog() -> PhaseCatalog {
    PhaseCatalog::from_documents(&catalog_documents())
}

/// A single-phase pull.
pub fn pull(id: u32, start_ms: i64, end_ms: i64) -> PullDocument {
    pull_with_markers(id, start_ms, end_ms, &[(1, 0)])
}

/// A pull ending in the phase of its last marker.
pub fn pull_with_markers(
    id: u32,
    start_ms: i64,
    end_ms: i64,
    markers: &[(u32, i64)],
) -> PullDocument {
    let last_ordinal = markers.last().map_or(1, |&(ordinal, _)| ordinal);
    PullDocument {
        id: PullId(id),
        boss_id: BOSS,
        zone_name: "Dragonsong's Reprise".to_owned(),
        kill: false,
        start_offset_ms: start_ms,
        end_offset_ms: end_ms,
        explicit_combat_time_ms: None,
        last_phase_absolute_index: last_ordinal.saturating_sub(1) as usize,
        last_phase_display_index: last_ordinal as usize,
        phase_markers: markers
            .iter()
            .map(|&(ordinal, offset)| PhaseMarkerDocument {
                ordinal_id: PhaseOrdinal(ordinal),
                start_offset_ms: offset,
            })
            .collect(),
        boss_percent_remaining: 50,
        fight_percent_remaining: 75,
    }
}

fn roster_entry(id: u32, guid: i64, name: &str, job: &str, server: &str) -> RosterEntryDocument {
    RosterEntryDocument {
        id,
        guid: PlayerGuid(guid),
        name: name.to_owned(),
        job: job.to_owned(),
        server: server.to_owned(),
    }
}

/// A session with two players and one non-player roster entry.
pub fn session_doc(pulls: Vec<PullDocument>) -> SessionDocument {
    SessionDocument {
        title: "dsr prog #1".to_owned(),
        start_timestamp: START_MS,
        pulls,
        phase_catalog: Some(catalog_documents()),
        roster: vec![
            roster_entry(1, 1001, "Aria", "Paladin", "Twintania"),
            roster_entry(2, 1002, "Bryn", "WhiteMage", "Twintania"),
            roster_entry(3, 77, "Limit Break", "LimitBreak", ""),
        ],
    }
}

pub fn loaded_session(doc: SessionDocument) -> Session {
    Session::from_document(&doc, &EngineConfig::default())
        .unwrap()
        .session
}

/// A reconstructed, unweighted pull ending at catalog index `last_index`.
pub fn reconstructed(
    id: u32,
    start_ms: i64,
    end_ms: i64,
    markers: &[(u32, i64)],
    last_index: usize,
) -> ReconstructedPull {
    let mut doc = pull_with_markers(id, start_ms, end_ms, markers);
    doc.last_phase_absolute_index = last_index;
    reconstruct_pull(
        &doc,
        &catalog(),
        timestamp_from_millis(START_MS).unwrap(),
        MarkerOffsetBasis::PullRelative,
    )
    .unwrap()
}

/// A damage table covering a 30s window, every row active for 90% of it.
pub fn damage_table(pull: u32, phase: u32, rows: &[(i64, f64, f64)]) -> DamageTableRecord {
    const TOTAL_MS: i64 = 30_000;
    DamageTableRecord {
        pull_id: PullId(pull),
        phase_id: PhaseOrdinal(phase),
        table: DamageTableDocument {
            total_time_ms: TOTAL_MS,
            downtime_ms: 0,
            entries: rows
                .iter()
                .map(|&(guid, total_damage, total_raid_throughput)| DamageEntryDocument {
                    guid: PlayerGuid(guid),
                    name: format!("entity {guid}"),
                    total_damage,
                    total_raid_throughput,
                    throughput_taken: 0.0,
                    throughput_given: 0.0,
                    active_time_ms: TOTAL_MS * 9 / 10,
                })
                .collect(),
        },
    }
}
