mod config;
mod error;
mod rds_snapshot_client;
mod share;
mod snapshot;

use lambda_runtime::{handler_fn, Context, Error};
use serde_json::Value;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ShareConfig;
use crate::error::SnapshotToolError;
use crate::rds_snapshot_client::RdsSnapshotClient;
use crate::share::{share_snapshots, ShareReport};

const LAMBDA_RUNTIME_API: &str = "AWS_LAMBDA_RUNTIME_API";

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::default().add_directive(config::log_level(|key| env::var(key).ok()).into()),
        )
        .with_target(false)
        // CloudWatch adds the ingestion time.
        .without_time()
        .init();

    if env::var_os(LAMBDA_RUNTIME_API).is_none() {
        let report = run_share().await?;
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    lambda_runtime::run(handler_fn(share_handler)).await?;
    Ok(())
}

async fn share_handler(_event: Value, context: Context) -> Result<ShareReport, Error> {
    info!(request_id = %context.request_id, "share snapshots invoked");
    Ok(run_share().await?)
}

async fn run_share() -> Result<ShareReport, SnapshotToolError> {
    let config = ShareConfig::from_env()?;
    info!(
        region = %config.region.name(),
        platform = config.platform.as_deref().unwrap_or("-"),
        "sharing manual snapshots"
    );
    let client = RdsSnapshotClient::new(config.region());
    share_snapshots(&client, &config).await
}
