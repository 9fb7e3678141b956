use serde::{Deserialize, Serialize};

/// Encounter identifier assigned by the log service. `0` marks trash pulls.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct BossId(pub u32);

impl BossId {
    #[must_use]
    pub fn is_trash(self) -> bool {
        self.0 == 0
    }
}

/// Pull identifier, unique within one session document.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PullId(pub u32);

/// 1-based phase ordinal as reported on phase markers.
///
/// The phase catalog is 0-based, so ordinal `n` names catalog entry `n - 1`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PhaseOrdinal(pub u32);

impl PhaseOrdinal {
    /// Catalog index this ordinal refers to, or `None` for ordinal 0.
    #[must_use]
    pub fn catalog_index(self) -> Option<usize> {
        usize::try_from(self.0).ok()?.checked_sub(1)
    }
}

/// Stable player identifier shared by roster entries and damage-table rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PlayerGuid(pub i64);

/// Cross-session player identity: the same character on the same job.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{name} ({job})")]
pub struct PlayerIdentity {
    pub name: String,
    pub job: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_index_is_ordinal_minus_one() {
        assert_eq!(PhaseOrdinal(1).catalog_index(), Some(0));
        assert_eq!(PhaseOrdinal(7).catalog_index(), Some(6));
        assert_eq!(PhaseOrdinal(0).catalog_index(), None);
    }

    #[test]
    fn test_ids_are_transparent_in_json() {
        let id: PullId = serde_json::from_str("12").unwrap();
        assert_eq!(id, PullId(12));
        assert_eq!(serde_json::to_string(&BossId(1065)).unwrap(), "1065");
    }

    #[test]
    fn test_trash_boss() {
        assert!(BossId(0).is_trash());
        assert!(!BossId(1065).is_trash());
    }
}
