//! Immutable reference tables injected into the engine.
//!
//! - [`PhaseCatalog`]: boss id to ordered phase names, taken from each session document
//! - [`EnrageTable`]: boss id and phase name to the reference ("enrage") duration
//! - [`JobTable`]: display order of job tags
//!
//! Lookups fail closed with a [`LookupError`]; nothing defaults silently.

use std::collections::BTreeMap;

use crate::{
    document::PhaseCatalogDocument,
    error::LookupError,
    ids::{BossId, PhaseOrdinal},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseCatalog {
    phases: BTreeMap<BossId, Vec<String>>,
}

impl PhaseCatalog {
    /// Builds a catalog from document entries.
    ///
    /// If a boss appears more than once, the first entry wins.
    #[must_use]
    pub fn from_documents(entries: &[PhaseCatalogDocument]) -> Self {
        let mut phases = BTreeMap::new();
        for entry in entries {
            phases
                .entry(entry.boss_id)
                .or_insert_with(|| entry.phase_names.clone());
        }
        Self { phases }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phase_names(&self, boss: BossId) -> Result<&[String], LookupError> {
        self.phases
            .get(&boss)
            .map(Vec::as_slice)
            .ok_or(LookupError::UnknownBoss { boss })
    }

    /// Phase name at a 0-based catalog index.
    pub fn phase_name(&self, boss: BossId, index: usize) -> Result<&str, LookupError> {
        let names = self.phase_names(boss)?;
        names
            .get(index)
            .map(String::as_str)
            .ok_or(LookupError::PhaseIndexOutOfRange {
                boss,
                index,
                len: names.len(),
            })
    }

    /// Phase name for a 1-based marker ordinal.
    pub fn phase_name_for_ordinal(
        &self,
        boss: BossId,
        ordinal: PhaseOrdinal,
    ) -> Result<&str, LookupError> {
        let index = ordinal
            .catalog_index()
            .ok_or(LookupError::InvalidOrdinal { boss, ordinal })?;
        self.phase_name(boss, index)
    }

    /// Catalog position of a phase name, used to order per-phase output.
    pub fn position(&self, boss: BossId, phase: &str) -> Result<usize, LookupError> {
        let names = self.phase_names(boss)?;
        names
            .iter()
            .position(|name| name == phase)
            .ok_or_else(|| LookupError::MissingPhase {
                boss,
                phase: phase.to_owned(),
            })
    }
}

/// Reference duration, in seconds, past which a phase cannot still be running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrageTable {
    durations: BTreeMap<(BossId, String), f64>,
}

impl EnrageTable {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (BossId, String, f64)>,
    {
        Self {
            durations: entries
                .into_iter()
                .map(|(boss, phase, secs)| ((boss, phase), secs))
                .collect(),
        }
    }

    pub fn get(&self, boss: BossId, phase: &str) -> Result<f64, LookupError> {
        self.durations
            .get(&(boss, phase.to_owned()))
            .copied()
            .ok_or_else(|| LookupError::MissingEnrage {
                boss,
                phase: phase.to_owned(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Display order of job tags. Unknown jobs sort after every known one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTable {
    order: Vec<String>,
}

impl JobTable {
    pub fn new<I, S>(jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: jobs.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn rank(&self, job: &str) -> usize {
        self.order
            .iter()
            .position(|j| j.eq_ignore_ascii_case(job))
            .unwrap_or(self.order.len())
    }
}
