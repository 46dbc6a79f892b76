use std::collections::{HashMap, HashSet};
use std::convert::TryFrom;

use once_cell::sync::Lazy;
use regex::Regex;
use rusoto_rds::{DBSnapshot, Tag};

use crate::error::SnapshotToolError;

pub const MANUAL_SNAPSHOT_TYPE: &str = "manual";

const AVAILABLE_STATUS: &str = "available";
const CREATED_BY_KEY: &str = "CreatedBy";
const CREATED_BY_VALUE: &str = "Snapshot Tool for RDS";
const SHARE_KEY: &str = "shareAndCopy";
const SHARE_VALUE: &str = "YES";

/// Patterns that select every instance instead of being compiled as a regex.
const MATCH_ALL_PATTERNS: [&str; 2] = ["ALL_INSTANCES", "ALL_SNAPSHOTS"];

pub static SUPPORTED_ENGINES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mariadb",
        "sqlserver-se",
        "sqlserver-ee",
        "sqlserver-ex",
        "sqlserver-web",
        "mysql",
        "oracle-se",
        "oracle-se1",
        "oracle-se2",
        "oracle-ee",
        "postgres",
    ]
    .iter()
    .copied()
    .collect()
});

#[derive(Debug, Clone)]
pub enum SnapshotPattern {
    All,
    Regex(Regex),
}

impl SnapshotPattern {
    pub fn parse(pattern: &str) -> Result<Self, SnapshotToolError> {
        if MATCH_ALL_PATTERNS.contains(&pattern) {
            return Ok(SnapshotPattern::All);
        }
        Ok(SnapshotPattern::Regex(Regex::new(pattern)?))
    }

    /// Unanchored search, so `prod` matches `app-prod-01`.
    pub fn matches(&self, instance_identifier: &str) -> bool {
        match self {
            SnapshotPattern::All => true,
            SnapshotPattern::Regex(regex) => regex.is_match(instance_identifier),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualSnapshot {
    pub identifier: String,
    pub arn: String,
    pub instance_identifier: String,
    pub engine: String,
    pub status: String,
    pub snapshot_type: String,
}

impl TryFrom<DBSnapshot> for ManualSnapshot {
    type Error = SnapshotToolError;

    fn try_from(snapshot: DBSnapshot) -> Result<Self, Self::Error> {
        Ok(ManualSnapshot {
            identifier: snapshot
                .db_snapshot_identifier
                .ok_or(SnapshotToolError::NoneValue)?,
            arn: snapshot.db_snapshot_arn.ok_or(SnapshotToolError::NoneValue)?,
            instance_identifier: snapshot.db_instance_identifier.unwrap_or_default(),
            engine: snapshot.engine.unwrap_or_default(),
            status: snapshot.status.unwrap_or_default(),
            snapshot_type: snapshot.snapshot_type.unwrap_or_default(),
        })
    }
}

impl ManualSnapshot {
    pub fn is_available(&self) -> bool {
        self.status.to_lowercase() == AVAILABLE_STATUS
    }

    pub fn is_own_source(&self, pattern: &SnapshotPattern) -> bool {
        self.snapshot_type == MANUAL_SNAPSHOT_TYPE
            && SUPPORTED_ENGINES.contains(self.engine.as_str())
            && pattern.matches(&self.instance_identifier)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TagSet {
    tags: HashMap<String, String>,
}

impl From<Vec<Tag>> for TagSet {
    fn from(tags: Vec<Tag>) -> Self {
        TagSet {
            tags: tags
                .into_iter()
                .filter_map(|tag| Some((tag.key?, tag.value.unwrap_or_default())))
                .collect(),
        }
    }
}

impl TagSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn is_created_by_tool(&self) -> bool {
        self.get(CREATED_BY_KEY) == Some(CREATED_BY_VALUE)
    }

    pub fn is_marked_for_sharing(&self) -> bool {
        self.get(SHARE_KEY) == Some(SHARE_VALUE) && self.is_created_by_tool()
    }
}
