use std::path::PathBuf;

use raidprog_analysis::{
    cross_session::{CrossSessionStatistics, CrossSessionStats},
    player_index::{PerPullPlayerThroughput, ThroughputMetric},
    progression::ProgressionSeries,
    reconstruct::ReconstructedPull,
    summary::SessionSummary,
};
use raidprog_core::{Diagnostic, EngineConfig};
use serde::Serialize;

use crate::{analysis::Analysis, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    /// Session bundle files
    #[arg(required = true)]
    bundles: Vec<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    sessions: Vec<SessionExport<'a>>,
    progression: Vec<ProgressionExport>,
    diagnostics: &'a [Diagnostic],
}

#[derive(Debug, Serialize)]
struct SessionExport<'a> {
    title: &'a str,
    tag: Option<&'a str>,
    summary: SessionSummary,
    pulls: &'a [ReconstructedPull],
    throughput: PerPullPlayerThroughput,
}

#[derive(Debug, Serialize)]
struct ProgressionExport {
    #[serde(flatten)]
    series: ProgressionSeries,
    cross_session: CrossSessionStats,
}

pub(crate) fn run(arg: &ExportArg, config: &EngineConfig) -> anyhow::Result<()> {
    let ExportArg { bundles, output } = arg;

    let mut analysis = Analysis::load(bundles, config)?;
    let series = analysis.progression();

    let stats = CrossSessionStatistics::from_config(config);
    let progression = series
        .into_iter()
        .map(|series| {
            let cross_session = analysis.cross_session(&series.tag, &stats);
            ProgressionExport {
                series,
                cross_session,
            }
        })
        .collect::<Vec<_>>();

    let jobs = config.job_table();
    let mut sessions = Vec::with_capacity(analysis.sessions.len());
    for analyzed in &analysis.sessions {
        let session = &analyzed.session;
        let Ok(summary) = session.summarize() else {
            continue;
        };
        sessions.push(SessionExport {
            title: &session.title,
            tag: session.tag.as_deref(),
            summary,
            pulls: &session.pulls,
            throughput: analyzed.index.per_pull_throughput(
                session,
                &jobs,
                ThroughputMetric::RaidThroughput,
            ),
        });
    }

    let document = ExportDocument {
        sessions,
        progression,
        diagnostics: &analysis.diagnostics,
    };
    Output::save_json(&document, output.clone())?;
    Ok(())
}
