//! Persisted schema version tags (`major.minor`).
//!
//! A major bump means the snapshot layout is incompatible and is discarded.
//! A minor bump keeps items but requires derived status to be recomputed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

/// Schema version written by this build.
pub const DATA_STRUCTURE_VERSION: &str = "1.0";

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:\.(\d+))?\s*$").expect("valid version regex"));

/// Parsed `major.minor` tag. A missing minor reads as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub fn parse(value: &str) -> Option<Self> {
        let captures = VERSION_RE.captures(value)?;
        let major = captures.get(1)?.as_str().parse().ok()?;
        let minor = match captures.get(2) {
            Some(minor) => minor.as_str().parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Outcome of comparing a persisted version with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    /// Nothing was persisted; store starts empty.
    Initialized,
    /// Major mismatch; persisted data is dropped.
    Cleared,
    /// Minor mismatch; items kept, derived status recomputed.
    Migrated,
    /// Versions match.
    Unchanged,
}

impl VersionCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Cleared => "cleared",
            Self::Migrated => "migrated",
            Self::Unchanged => "unchanged",
        }
    }

    /// Whether persisted items survive this outcome.
    pub fn keeps_data(self) -> bool {
        matches!(self, Self::Migrated | Self::Unchanged)
    }
}

impl Display for VersionCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies `persisted` against `current`.
///
/// Blank input counts as absent. A tag that does not parse is treated like a
/// major mismatch.
pub fn classify(persisted: Option<&str>, current: &str) -> VersionCheck {
    let persisted = match persisted.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return VersionCheck::Initialized,
    };

    let (Some(persisted), Some(current)) =
        (SchemaVersion::parse(persisted), SchemaVersion::parse(current))
    else {
        return VersionCheck::Cleared;
    };

    if persisted.major != current.major {
        VersionCheck::Cleared
    } else if persisted.minor != current.minor {
        VersionCheck::Migrated
    } else {
        VersionCheck::Unchanged
    }
}
