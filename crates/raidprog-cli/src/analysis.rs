use std::path::PathBuf;

use raidprog_analysis::{
    cross_session::{CrossSessionStatistics, CrossSessionStats, SessionPerformance},
    player_index::PlayerIndex,
    progression::{ProgressionGroup, ProgressionSeries, group_by_tag},
    session::Session,
};
use raidprog_core::{Diagnostic, EngineConfig};

use crate::{schema::SessionBundle, util::read_json_file};

/// A loaded session with its indexed damage observations.
#[derive(Debug)]
pub struct AnalyzedSession {
    pub session: Session,
    pub index: PlayerIndex,
}

#[derive(Debug, Default)]
pub struct Analysis {
    pub sessions: Vec<AnalyzedSession>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// Loads every bundle, skipping sessions the engine rejects.
    ///
    /// Unreadable files are an error; unusable sessions are not.
    pub fn load(paths: &[PathBuf], config: &EngineConfig) -> anyhow::Result<Self> {
        let mut analysis = Self::default();
        for path in paths {
            let bundle: SessionBundle = read_json_file("session bundle", path)?;
            let title = bundle.session.title.clone();
            let loaded = match Session::from_document(&bundle.session, config) {
                Ok(loaded) => loaded,
                Err(err) => {
                    tracing::warn!(path = %path.display(), "skipping session: {err}");
                    analysis.diagnostics.push(Diagnostic::session(&title, &err));
                    continue;
                }
            };
            analysis.diagnostics.extend(loaded.diagnostics);

            let (index, observations) = PlayerIndex::build(&loaded.session, &bundle.damage_tables);
            analysis.diagnostics.extend(observations.diagnostics);
            tracing::info!(
                session = %title,
                pulls = loaded.session.pulls.len(),
                players = loaded.session.roster.len(),
                "loaded session"
            );
            analysis.sessions.push(AnalyzedSession {
                session: loaded.session,
                index,
            });
        }
        Ok(analysis)
    }

    pub fn groups(&self) -> Vec<ProgressionGroup<'_>> {
        group_by_tag(self.sessions.iter().map(|s| &s.session))
    }

    /// Derives the series of every group, skipping groups that fail.
    pub fn progression(&mut self) -> Vec<ProgressionSeries> {
        let mut series = vec![];
        let mut diagnostics = vec![];
        for group in self.groups() {
            match ProgressionSeries::from_group(&group) {
                Ok(s) => series.push(s),
                Err(err) => {
                    tracing::warn!(tag = %group.tag, "skipping progression group: {err}");
                    diagnostics.push(Diagnostic::session(&err.title, &err));
                }
            }
        }
        self.diagnostics.extend(diagnostics);
        series
    }

    /// Pools throughput of every session sharing `tag`.
    pub fn cross_session(&self, tag: &str, stats: &CrossSessionStatistics) -> CrossSessionStats {
        let perf = self
            .sessions
            .iter()
            .filter(|s| s.session.tag.as_deref() == Some(tag))
            .map(|s| SessionPerformance {
                session: &s.session,
                index: &s.index,
            })
            .collect::<Vec<_>>();
        stats.compute(&perf, None)
    }
}
