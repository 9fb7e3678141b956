//! Progression groups and the series derived from them.
//!
//! Sessions sharing a progression tag form one group, ordered by start time.
//! Each group yields per-session series (cumulative end-phase distributions,
//! rounded pull lengths, fight progress) and the best pull reached so far.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use raidprog_core::{EmptySessionError, PullId};
use raidprog_stats::rounding::{MidpointRounding, round_to};
use serde::Serialize;

use crate::{
    session::Session,
    summary::{CumulativePoint, SessionSummary},
};

/// Sessions sharing one progression tag, ordered by start time.
#[derive(Debug, Clone)]
pub struct ProgressionGroup<'a> {
    pub tag: String,
    pub sessions: Vec<&'a Session>,
}

/// Groups sessions by tag. Untagged sessions belong to no group.
pub fn group_by_tag<'a, I>(sessions: I) -> Vec<ProgressionGroup<'a>>
where
    I: IntoIterator<Item = &'a Session>,
{
    let mut groups = BTreeMap::<&str, Vec<&Session>>::new();
    for session in sessions {
        if let Some(tag) = &session.tag {
            groups.entry(tag.as_str()).or_default().push(session);
        }
    }
    groups
        .into_iter()
        .map(|(tag, mut sessions)| {
            sessions.sort_by_key(|s| s.start);
            ProgressionGroup {
                tag: tag.to_owned(),
                sessions,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionProgress {
    /// 1-based position within the group
    pub number: usize,
    pub title: String,
    pub start: DateTime<Utc>,
    pub cumulative_end_percent: Vec<CumulativePoint>,
    pub cumulative_end_secs: Vec<CumulativePoint>,
    /// Whole seconds
    pub longest_pull_secs: f64,
    /// Whole seconds
    pub weighted_average_secs: f64,
    /// Fight percent remaining of each pull, in pull order
    pub fight_progress: Vec<f64>,
}

/// The furthest any pull in a group got.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPull {
    /// 1-based session number within the group
    pub session: usize,
    /// 1-based pull number within the session
    pub pull: usize,
    pub pull_id: PullId,
    pub end_phase: String,
    pub kill: bool,
    pub end_phase_percent: f64,
    pub end_fight_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionSeries {
    pub tag: String,
    pub sessions: Vec<SessionProgress>,
    pub best_pull: Option<BestPull>,
}

impl ProgressionSeries {
    /// Derives the series for every session of `group`.
    ///
    /// Fails if any session has no pulls. A loaded [`Session`] is never
    /// empty, so only hand-built sessions hit this.
    pub fn from_group(group: &ProgressionGroup<'_>) -> Result<Self, EmptySessionError> {
        let mut sessions = Vec::with_capacity(group.sessions.len());
        let mut best_pull: Option<BestPull> = None;

        for (i, session) in group.sessions.iter().enumerate() {
            let number = i + 1;
            let summary = session.summarize()?;
            sessions.push(session_progress(number, session, &summary));

            for (j, pull) in session.pulls.iter().enumerate() {
                // strict comparison keeps the earliest of equally good pulls
                if best_pull
                    .as_ref()
                    .is_some_and(|best| best.end_fight_percent <= pull.end_fight_percent)
                {
                    continue;
                }
                best_pull = Some(BestPull {
                    session: number,
                    pull: j + 1,
                    pull_id: pull.id,
                    end_phase: pull.end_phase_name.clone(),
                    kill: pull.kill,
                    end_phase_percent: pull.end_phase_percent,
                    end_fight_percent: pull.end_fight_percent,
                });
            }
        }

        tracing::debug!(tag = %group.tag, sessions = sessions.len(), "derived progression series");
        Ok(Self {
            tag: group.tag.clone(),
            sessions,
            best_pull,
        })
    }
}

fn session_progress(number: usize, session: &Session, summary: &SessionSummary) -> SessionProgress {
    SessionProgress {
        number,
        title: session.title.clone(),
        start: session.start,
        cumulative_end_percent: summary.cumulative_end_percentages(&session.phase_names),
        cumulative_end_secs: summary.cumulative_end_seconds(&session.phase_names),
        longest_pull_secs: round_to(summary.longest_pull_secs, 0, MidpointRounding::AwayFromZero),
        weighted_average_secs: round_to(
            summary.weighted_average_secs,
            0,
            MidpointRounding::AwayFromZero,
        ),
        fight_progress: session.pulls.iter().map(|p| p.end_fight_percent).collect(),
    }
}
