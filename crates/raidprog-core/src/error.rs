//! Error taxonomy and non-fatal diagnostics.
//!
//! Each error type corresponds to the scope it invalidates:
//!
//! | Error                 | Skipped unit                          |
//! |-----------------------|---------------------------------------|
//! | [`ValidationError`]   | the whole session document            |
//! | [`LookupError`]       | one pull, damage table or observation |
//! | [`EmptySessionError`] | the session, from progression grouping|
//! | [`StatisticsError`]   | one (player, phase) bucket            |
//!
//! None of them aborts a run. Callers collect them as [`Diagnostic`]s next
//! to the output that did validate.

use std::fmt;

use serde::Serialize;

use crate::ids::{BossId, PhaseOrdinal, PlayerIdentity, PullId};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ValidationError {
    #[display("session '{title}' has no phase catalog")]
    MissingPhaseCatalog { title: String },
    #[display("session '{title}' has invalid start timestamp {timestamp_ms}")]
    InvalidStartTimestamp { title: String, timestamp_ms: i64 },
    #[display("session '{title}' has no progression tag")]
    MissingTag { title: String },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum LookupError {
    #[display("boss {boss} is not in the phase catalog")]
    UnknownBoss { boss: BossId },
    #[display("phase index {index} is out of range for boss {boss} ({len} phases)")]
    PhaseIndexOutOfRange {
        boss: BossId,
        index: usize,
        len: usize,
    },
    #[display("phase ordinal {ordinal} does not name a catalog phase for boss {boss}")]
    InvalidOrdinal { boss: BossId, ordinal: PhaseOrdinal },
    #[display("phase '{phase}' is not in the catalog for boss {boss}")]
    MissingPhase { boss: BossId, phase: String },
    #[display("no enrage reference for boss {boss} phase '{phase}'")]
    MissingEnrage { boss: BossId, phase: String },
    #[display("pull {pull} is for boss {found}, session is for boss {expected}")]
    BossMismatch {
        pull: PullId,
        expected: BossId,
        found: BossId,
    },
    #[display("pull {pull} is not part of the reconstructed session")]
    UnknownPull { pull: PullId },
    #[display("pull {pull} has no reconstructed phase {ordinal}")]
    UnknownPhase { pull: PullId, ordinal: PhaseOrdinal },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("session '{title}' has no pulls left after filtering")]
pub struct EmptySessionError {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatisticsError {
    #[display("non-finite throughput for {player} in phase '{phase}'")]
    NonFinite {
        player: PlayerIdentity,
        phase: String,
    },
}

/// A failure that excludes a whole session.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    Validation(ValidationError),
    Empty(EmptySessionError),
}

/// What a [`Diagnostic`] is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticScope {
    Session { title: String },
    Pull { session: String, pull: PullId },
    Player { player: PlayerIdentity, phase: String },
}

impl fmt::Display for DiagnosticScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticScope::Session { title } => write!(f, "session '{title}'"),
            DiagnosticScope::Pull { session, pull } => {
                write!(f, "session '{session}' pull {pull}")
            }
            DiagnosticScope::Player { player, phase } => write!(f, "{player} phase '{phase}'"),
        }
    }
}

/// A non-fatal integrity issue attached to best-effort output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub scope: DiagnosticScope,
    pub message: String,
}

impl Diagnostic {
    pub fn new(scope: DiagnosticScope, error: &dyn std::error::Error) -> Self {
        Self {
            scope,
            message: error.to_string(),
        }
    }

    #[must_use]
    pub fn session(title: &str, error: &dyn std::error::Error) -> Self {
        Self::new(
            DiagnosticScope::Session {
                title: title.to_owned(),
            },
            error,
        )
    }

    #[must_use]
    pub fn pull(session: &str, pull: PullId, error: &dyn std::error::Error) -> Self {
        Self::new(
            DiagnosticScope::Pull {
                session: session.to_owned(),
                pull,
            },
            error,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_message() {
        let err = LookupError::PhaseIndexOutOfRange {
            boss: BossId(1065),
            index: 9,
            len: 8,
        };
        assert_eq!(
            err.to_string(),
            "phase index 9 is out of range for boss 1065 (8 phases)"
        );
    }

    #[test]
    fn test_session_error_wraps_source() {
        let err = SessionError::from(EmptySessionError {
            title: "prog #1".to_owned(),
        });
        assert_eq!(err.to_string(), "session 'prog #1' has no pulls left after filtering");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_diagnostic_display_names_the_pull() {
        let err = LookupError::UnknownBoss { boss: BossId(7) };
        let diag = Diagnostic::pull("prog #2", PullId(14), &err);
        assert_eq!(
            diag.to_string(),
            "session 'prog #2' pull 14: boss 7 is not in the phase catalog"
        );
    }
}
