use std::{io::Write, path::PathBuf};

use raidprog_analysis::{
    cross_session::{CrossSessionStatistics, CrossSessionStats},
    progression::ProgressionSeries,
    session::Session,
    summary::SessionSummary,
};
use raidprog_core::EngineConfig;

use crate::{
    analysis::Analysis,
    util::{Output, format_duration},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReportArg {
    /// Session bundle files
    #[arg(required = true)]
    bundles: Vec<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReportArg, config: &EngineConfig) -> anyhow::Result<()> {
    let ReportArg { bundles, output } = arg;

    let mut analysis = Analysis::load(bundles, config)?;
    let progression = analysis.progression();
    let stats = CrossSessionStatistics::from_config(config);
    let mut out = Output::from_output_path(output.clone())?;

    for analyzed in &analysis.sessions {
        let summary = match analyzed.session.summarize() {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };
        write_session(&mut out, &analyzed.session, &summary)?;
    }
    for series in &progression {
        let pooled = analysis.cross_session(&series.tag, &stats);
        write_progression(&mut out, series, &pooled)?;
    }

    if !analysis.diagnostics.is_empty() {
        writeln!(out, "Diagnostics:")?;
        for diagnostic in &analysis.diagnostics {
            writeln!(out, "  {diagnostic}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_session<W>(out: &mut W, session: &Session, summary: &SessionSummary) -> anyhow::Result<()>
where
    W: Write,
{
    writeln!(
        out,
        "== {} ({}) ==",
        session.title,
        session.start.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(
        out,
        "Pulls: {}  Total: {}  In combat: {}  Out of combat: {}",
        summary.pull_count,
        format_duration(summary.total_time_secs),
        format_duration(summary.time_in_combat_secs),
        format_duration(summary.time_out_of_combat_secs),
    )?;
    writeln!(
        out,
        "Longest pull: {}  Average: {}  Weighted average: {}",
        format_duration(summary.longest_pull_secs),
        format_duration(summary.simple_average_secs),
        format_duration(summary.weighted_average_secs),
    )?;

    writeln!(out, "Pulls ending in phase:")?;
    for bucket in &summary.pulls_ending_in_phase {
        writeln!(
            out,
            "  {:<24} {:>4}  {:>7}  {:>6.2}%",
            bucket.phase,
            bucket.count,
            format_duration(bucket.total_secs),
            bucket.weight_share * 100.0,
        )?;
    }
    writeln!(out, "Time in phase:")?;
    for phase in &summary.time_in_phase {
        writeln!(out, "  {:<24} {:>7}", phase.phase, format_duration(phase.total_secs))?;
    }

    writeln!(out, "Pulls:")?;
    for (i, pull) in session.pulls.iter().enumerate() {
        writeln!(
            out,
            "  #{:<3} {}  {:>6}  {:<24} boss {:>3}%  fight {:>3}%{}",
            i + 1,
            pull.start_time.format("%H:%M:%S"),
            format_duration(pull.combat_secs()),
            pull.end_phase_name,
            pull.end_phase_percent,
            pull.end_fight_percent,
            if pull.kill { "  KILL" } else { "" },
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_progression<W>(
    out: &mut W,
    series: &ProgressionSeries,
    pooled: &CrossSessionStats,
) -> anyhow::Result<()>
where
    W: Write,
{
    writeln!(out, "== Progression: {} ==", series.tag)?;
    for session in &series.sessions {
        writeln!(
            out,
            "  #{:<3} {}  longest {}  weighted {}",
            session.number,
            session.title,
            format_duration(session.longest_pull_secs),
            format_duration(session.weighted_average_secs),
        )?;
    }
    if let Some(best) = &series.best_pull {
        writeln!(
            out,
            "Best pull: session {} pull {}, {} at {}% (fight {}%){}",
            best.session,
            best.pull,
            best.end_phase,
            best.end_phase_percent,
            best.end_fight_percent,
            if best.kill { ", kill" } else { "" },
        )?;
    }

    if !pooled.buckets.is_empty() {
        writeln!(out, "Throughput by phase:")?;
        for bucket in &pooled.buckets {
            let player = bucket.player.to_string();
            writeln!(
                out,
                "  {:<32} {:<24} {:>9.1} ± {:>7.1}  (n={})",
                player,
                bucket.phase,
                bucket.mean,
                bucket.half_width,
                bucket.sample_count,
            )?;
        }
    }
    writeln!(out)?;
    Ok(())
}
