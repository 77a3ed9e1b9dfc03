//! AWS SDK client setup and the DynamoDB-backed inspector (Imperative Shell).

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use dynarep_core::provisioning::{InspectError, TableInspector};
use dynarep_core::replication::TableMetadata;

use super::conversions::table_metadata;
use super::error::map_describe_table_error;

/// AWS client configuration.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// Region the source tables live in.
    pub region: String,
}

impl AwsConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}

/// Inspects tables with `DescribeTable`.
#[derive(Debug, Clone)]
pub struct DynamoInspector {
    client: Client,
}

impl DynamoInspector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableInspector for DynamoInspector {
    async fn inspect(&self, table_name: &str) -> Result<TableMetadata, InspectError> {
        let response = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_describe_table_error(e, table_name))?;

        let table = response.table().ok_or_else(|| InspectError::Query {
            table_name: table_name.to_string(),
            message: "DescribeTable returned no table description".to_string(),
        })?;

        table_metadata(table_name, table).map_err(|source| InspectError::Metadata {
            table_name: table_name.to_string(),
            source,
        })
    }
}
