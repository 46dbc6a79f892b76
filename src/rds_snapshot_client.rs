use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_rds::{
    DescribeDBSnapshotsMessage, ListTagsForResourceMessage, ModifyDBSnapshotAttributeMessage, Rds,
    RdsClient,
};
use std::convert::TryFrom;
use tracing::{debug, warn};

use crate::error::SnapshotToolError;
use crate::snapshot::{ManualSnapshot, TagSet, MANUAL_SNAPSHOT_TYPE};

const RESTORE_ATTRIBUTE: &str = "restore";

pub struct RdsSnapshotClient {
    client: RdsClient,
}

#[async_trait]
pub trait Describe {
    async fn describe_manual_snapshots(&self) -> Result<Vec<ManualSnapshot>, SnapshotToolError>;
}

#[async_trait]
pub trait ReadTags {
    async fn list_tags(&self, arn: &str) -> Result<TagSet, SnapshotToolError>;
}

#[async_trait]
pub trait Share {
    async fn authorize_restore(
        &self,
        snapshot_identifier: &str,
        account_id: &str,
    ) -> Result<(), SnapshotToolError>;
}

#[async_trait]
impl Describe for RdsSnapshotClient {
    async fn describe_manual_snapshots(&self) -> Result<Vec<ManualSnapshot>, SnapshotToolError> {
        let mut snapshots = Vec::<ManualSnapshot>::new();
        let mut marker: Option<String> = None;
        loop {
            let request = DescribeDBSnapshotsMessage {
                snapshot_type: Some(MANUAL_SNAPSHOT_TYPE.to_string()),
                marker: marker.clone(),
                ..DescribeDBSnapshotsMessage::default()
            };
            let page = self.client.describe_db_snapshots(request).await?;

            let page_snapshots = page.db_snapshots.unwrap_or_default();
            debug!(count = page_snapshots.len(), "described snapshot page");
            for snapshot in page_snapshots {
                snapshots.push(ManualSnapshot::try_from(snapshot)?);
            }

            match page.marker {
                Some(next) if next.is_empty() => break,
                Some(next) if marker.as_deref() == Some(next.as_str()) => {
                    warn!(marker = %next, "describe returned the same marker twice");
                    break;
                }
                Some(next) => marker = Some(next),
                None => break,
            }
        }
        Ok(snapshots)
    }
}

#[async_trait]
impl ReadTags for RdsSnapshotClient {
    async fn list_tags(&self, arn: &str) -> Result<TagSet, SnapshotToolError> {
        let result = self
            .client
            .list_tags_for_resource(ListTagsForResourceMessage {
                resource_name: arn.to_string(),
                ..ListTagsForResourceMessage::default()
            })
            .await?;
        Ok(TagSet::from(result.tag_list.unwrap_or_default()))
    }
}

#[async_trait]
impl Share for RdsSnapshotClient {
    async fn authorize_restore(
        &self,
        snapshot_identifier: &str,
        account_id: &str,
    ) -> Result<(), SnapshotToolError> {
        self.client
            .modify_db_snapshot_attribute(ModifyDBSnapshotAttributeMessage {
                db_snapshot_identifier: snapshot_identifier.to_string(),
                attribute_name: RESTORE_ATTRIBUTE.to_string(),
                values_to_add: Some(vec![account_id.to_string()]),
                ..ModifyDBSnapshotAttributeMessage::default()
            })
            .await?;
        Ok(())
    }
}

impl RdsSnapshotClient {
    pub fn new(region: Region) -> Self {
        Self::new_with_client(RdsClient::new(region))
    }

    pub fn new_with_client(client: RdsClient) -> Self {
        RdsSnapshotClient { client }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SnapshotToolError;
    use crate::rds_snapshot_client::{Describe, RdsSnapshotClient, ReadTags, Share};
    use crate::snapshot::ManualSnapshot;
    use rusoto_core::signature::{SignedRequest, SignedRequestPayload};
    use rusoto_mock::{
        MockCredentialsProvider, MockRequestDispatcher, MockResponseReader,
        MultipleMockRequestDispatcher, ReadMockResponse,
    };
    use rusoto_rds::RdsClient;
    use std::collections::HashMap;

    fn mock_client(dispatcher: MockRequestDispatcher) -> RdsSnapshotClient {
        RdsSnapshotClient::new_with_client(RdsClient::new_with(
            dispatcher,
            MockCredentialsProvider,
            Default::default(),
        ))
    }

    fn valid(file_name: &str) -> MockRequestDispatcher {
        MockRequestDispatcher::default().with_body(&*MockResponseReader::read_response(
            "test_resources/valid",
            file_name,
        ))
    }

    /// Query-protocol parameters, sent form-encoded in the request body.
    fn form_params(request: &SignedRequest) -> HashMap<String, String> {
        match request.payload {
            Some(SignedRequestPayload::Buffer(ref body)) => {
                serde_urlencoded::from_bytes(&body[..]).unwrap()
            }
            _ => HashMap::new(),
        }
    }

    fn expect_describe_page(file_name: &str, marker: Option<&'static str>) -> MockRequestDispatcher {
        valid(file_name).with_request_checker(move |request: &SignedRequest| {
            let params = form_params(request);
            assert_eq!(params.get("Action").map(String::as_str), Some("DescribeDBSnapshots"));
            assert_eq!(params.get("SnapshotType").map(String::as_str), Some("manual"));
            assert_eq!(params.get("Marker").map(String::as_str), marker);
        })
    }

    #[tokio::test]
    async fn test_describe_manual_snapshots() {
        let client = mock_client(expect_describe_page("describe_db_snapshots_last_page.xml", None));
        let result = client.describe_manual_snapshots().await;

        assert_eq!(
            result.unwrap(),
            [ManualSnapshot {
                identifier: "billing-2020-12-01-03-00".to_string(),
                arn: "arn:aws:rds:eu-west-1:111111111111:snapshot:billing-2020-12-01-03-00"
                    .to_string(),
                instance_identifier: "billing".to_string(),
                engine: "mysql".to_string(),
                status: "available".to_string(),
                snapshot_type: "manual".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_describe_follows_marker() {
        let client = RdsSnapshotClient::new_with_client(RdsClient::new_with(
            MultipleMockRequestDispatcher::new(vec![
                expect_describe_page("describe_db_snapshots_first_page.xml", None),
                expect_describe_page(
                    "describe_db_snapshots_last_page.xml",
                    Some("orders-2020-11-30-03-00"),
                ),
            ]),
            MockCredentialsProvider,
            Default::default(),
        ));
        let result = client.describe_manual_snapshots().await.unwrap();

        let identifiers: Vec<&str> = result
            .iter()
            .map(|snapshot| snapshot.identifier.as_str())
            .collect();
        assert_eq!(
            identifiers,
            [
                "orders-2020-12-01-03-00",
                "orders-2020-11-30-03-00",
                "billing-2020-12-01-03-00",
            ]
        );
    }

    #[tokio::test]
    async fn test_describe_stops_on_repeated_marker() {
        let client = RdsSnapshotClient::new_with_client(RdsClient::new_with(
            MultipleMockRequestDispatcher::new(vec![
                expect_describe_page("describe_db_snapshots_first_page.xml", None),
                expect_describe_page(
                    "describe_db_snapshots_first_page.xml",
                    Some("orders-2020-11-30-03-00"),
                ),
            ]),
            MockCredentialsProvider,
            Default::default(),
        ));
        let result = client.describe_manual_snapshots().await.unwrap();

        assert_eq!(result.len(), 4);
    }

    #[tokio::test]
    async fn test_describe_error() {
        let client = mock_client(MockRequestDispatcher::with_status(400).with_body(
            &*MockResponseReader::read_response("test_resources/error", "rds_error.xml"),
        ));
        let result = client.describe_manual_snapshots().await;

        assert!(matches!(
            result,
            Err(SnapshotToolError::DescribeSnapshotsError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_tags() {
        let client = mock_client(valid("list_tags_for_resource.xml").with_request_checker(
            |request: &SignedRequest| {
                let params = form_params(request);
                assert_eq!(
                    params.get("ResourceName").map(String::as_str),
                    Some("arn:aws:rds:eu-west-1:111111111111:snapshot:orders-2020-12-01-03-00")
                );
            },
        ));
        let tags = client
            .list_tags("arn:aws:rds:eu-west-1:111111111111:snapshot:orders-2020-12-01-03-00")
            .await
            .unwrap();

        assert_eq!(tags.get("shareAndCopy"), Some("YES"));
        assert!(tags.is_created_by_tool());
        assert!(tags.is_marked_for_sharing());
    }

    #[tokio::test]
    async fn test_list_tags_error() {
        let client = mock_client(MockRequestDispatcher::with_status(400).with_body(
            &*MockResponseReader::read_response("test_resources/error", "rds_error.xml"),
        ));
        let result = client.list_tags("arn:aws:rds:eu-west-1:111111111111:snapshot:gone").await;

        assert!(matches!(result, Err(SnapshotToolError::ListTagsError(_))));
    }

    #[tokio::test]
    async fn test_authorize_restore() {
        let client = mock_client(valid("modify_db_snapshot_attribute.xml").with_request_checker(
            |request: &SignedRequest| {
                let params = form_params(request);
                assert_eq!(
                    params.get("Action").map(String::as_str),
                    Some("ModifyDBSnapshotAttribute")
                );
                assert_eq!(
                    params.get("DBSnapshotIdentifier").map(String::as_str),
                    Some("orders-2020-12-01-03-00")
                );
                assert_eq!(params.get("AttributeName").map(String::as_str), Some("restore"));

                let mut added: Vec<&str> = params
                    .iter()
                    .filter(|(key, _)| key.starts_with("ValuesToAdd."))
                    .map(|(_, value)| value.as_str())
                    .collect();
                added.sort();
                assert_eq!(added, ["222222222222"]);
                assert!(!params.keys().any(|key| key.starts_with("ValuesToRemove")));
            },
        ));
        let result = client
            .authorize_restore("orders-2020-12-01-03-00", "222222222222")
            .await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_authorize_restore_error() {
        let client = mock_client(MockRequestDispatcher::with_status(400).with_body(
            &*MockResponseReader::read_response("test_resources/error", "rds_error.xml"),
        ));
        let result = client
            .authorize_restore("orders-2020-12-01-03-00", "222222222222")
            .await;

        assert!(matches!(
            result,
            Err(SnapshotToolError::ModifyAttributeError(_))
        ));
    }
}
