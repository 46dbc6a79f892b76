use std::env;
use std::str::FromStr;

use rusoto_core::Region;
use tracing::level_filters::LevelFilter;

use crate::error::SnapshotToolError;
use crate::snapshot::SnapshotPattern;

const DEST_ACCOUNT: &str = "DEST_ACCOUNT";
const PATTERN: &str = "PATTERN";
const PLATFORM: &str = "PLATFORM";
const REGION_OVERRIDE: &str = "REGION_OVERRIDE";
const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
const LOG_LEVEL: &str = "LOG_LEVEL";

const DEFAULT_PATTERN: &str = "ALL_INSTANCES";
const DEFAULT_LOG_LEVEL: &str = "ERROR";
const NO_OVERRIDE: &str = "NO";

#[derive(Debug, Clone)]
pub struct ShareConfig {
    pub destination_account: String,
    pub pattern: SnapshotPattern,
    pub platform: Option<String>,
    pub region: Region,
}

impl ShareConfig {
    pub fn from_env() -> Result<Self, SnapshotToolError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SnapshotToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let destination_account = lookup(DEST_ACCOUNT)
            .map(|account| account.trim().to_string())
            .filter(|account| !account.is_empty())
            .ok_or_else(|| SnapshotToolError::Config(format!("{} is not set", DEST_ACCOUNT)))?;

        let pattern = SnapshotPattern::parse(
            &lookup(PATTERN).unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
        )?;

        let platform = lookup(PLATFORM)
            .map(|platform| platform.trim().to_string())
            .filter(|platform| !platform.is_empty());

        Ok(ShareConfig {
            destination_account,
            pattern,
            platform,
            region: resolve_region(&lookup)?,
        })
    }

    pub fn region(&self) -> Region {
        self.region.clone()
    }
}

fn resolve_region<F>(lookup: &F) -> Result<Region, SnapshotToolError>
where
    F: Fn(&str) -> Option<String>,
{
    let name = match lookup(REGION_OVERRIDE) {
        Some(region) if region != NO_OVERRIDE => Some(region),
        _ => lookup(AWS_DEFAULT_REGION),
    };
    match name.map(|name| name.trim().to_string()) {
        Some(name) if !name.is_empty() => Region::from_str(&name)
            .map_err(|error| SnapshotToolError::Config(format!("{}: {}", name, error))),
        _ => Ok(Region::default()),
    }
}

/// Maximum log level from `LOG_LEVEL`. Python logging names (`WARNING`,
/// `CRITICAL`, `NOTSET`, ...) are accepted; anything unparsable falls back to `error`.
pub fn log_level<F>(lookup: F) -> LevelFilter
where
    F: Fn(&str) -> Option<String>,
{
    let level = lookup(LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let level = level.trim().to_lowercase();
    let level = match level.as_str() {
        "critical" | "fatal" => "error",
        "warning" => "warn",
        "notset" => "trace",
        other => other,
    };
    LevelFilter::from_str(level).unwrap_or(LevelFilter::ERROR)
}
