use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ShareConfig;
use crate::error::SnapshotToolError;
use crate::rds_snapshot_client::{Describe, ReadTags, Share};
use crate::snapshot::ManualSnapshot;

/// Outcome of one sharing run, returned as the Lambda response.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ShareReport {
    /// Manual snapshots returned by the describe call.
    pub examined: usize,
    /// Own-source snapshots created by the snapshot tool.
    pub eligible: usize,
    pub shared: usize,
    /// Eligible snapshots not yet available or not tagged for sharing.
    pub skipped: usize,
}

struct Candidate {
    snapshot: ManualSnapshot,
    marked_for_sharing: bool,
}

pub async fn share_snapshots<C>(
    client: &C,
    config: &ShareConfig,
) -> Result<ShareReport, SnapshotToolError>
where
    C: Describe + ReadTags + Share + Sync,
{
    let snapshots = client.describe_manual_snapshots().await?;
    let mut report = ShareReport {
        examined: snapshots.len(),
        ..ShareReport::default()
    };
    let mut pending = 0usize;

    let mut candidates = Vec::<Candidate>::new();
    for snapshot in snapshots
        .into_iter()
        .filter(|snapshot| snapshot.is_own_source(&config.pattern))
    {
        match client.list_tags(&snapshot.arn).await {
            Ok(tags) if tags.is_created_by_tool() => candidates.push(Candidate {
                marked_for_sharing: tags.is_marked_for_sharing(),
                snapshot,
            }),
            Ok(_) => {}
            Err(e) => {
                error!(snapshot = %snapshot.identifier, error = %e, "could not read snapshot tags");
                pending += 1;
            }
        }
    }
    report.eligible = candidates.len();

    for Candidate {
        snapshot,
        marked_for_sharing,
    } in candidates
    {
        if !(snapshot.is_available() && marked_for_sharing) {
            report.skipped += 1;
            continue;
        }
        match client
            .authorize_restore(&snapshot.identifier, &config.destination_account)
            .await
        {
            Ok(()) => {
                info!(
                    snapshot = %snapshot.identifier,
                    account = %config.destination_account,
                    "shared snapshot"
                );
                report.shared += 1;
            }
            Err(e) => {
                error!(snapshot = %snapshot.identifier, error = %e, "could not share snapshot");
                pending += 1;
            }
        }
    }

    if pending > 0 {
        let failure = SnapshotToolError::PendingSnapshots(pending);
        error!(pending, "{}", failure);
        return Err(failure);
    }
    if report.shared == 0 {
        warn!(examined = report.examined, "no snapshots shared");
    }
    Ok(report)
}
