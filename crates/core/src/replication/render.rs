//! Rendering a plan into Terraform JSON configuration (Functional Core).
//!
//! The output is a single `main.tf.json` document. Every map is a `BTreeMap`
//! and every struct serializes its fields in declaration order, so the same
//! plan always renders to the same bytes and a rerun diffs as a no-op.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error::RenderError;
use super::plan::{BillingMode, Plan, StreamViewType, TABLE_RESOURCE_TYPE};
use super::region::Region;
use super::table::{validate_schema, AttributeType, Schema, SecondaryIndex};

/// File name of the rendered configuration inside the working area.
pub const ARTIFACT_FILE_NAME: &str = "main.tf.json";

/// Default version constraint for the AWS provider.
pub const DEFAULT_AWS_PROVIDER_VERSION: &str = "~> 5.0";

/// Settings that apply to the whole rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Region the source tables live in; the provider is configured for it.
    pub provider_region: Region,
    /// Local backend state file. Lives outside the working area so adoption survives reruns.
    pub state_path: PathBuf,
    pub aws_provider_version: String,
    /// Custom DynamoDB endpoint, e.g. DynamoDB Local.
    pub dynamodb_endpoint: Option<String>,
}

impl RenderOptions {
    pub fn new(provider_region: Region, state_path: impl Into<PathBuf>) -> Self {
        Self {
            provider_region,
            state_path: state_path.into(),
            aws_provider_version: DEFAULT_AWS_PROVIDER_VERSION.to_string(),
            dynamodb_endpoint: None,
        }
    }

    pub fn with_aws_provider_version(mut self, version: impl Into<String>) -> Self {
        self.aws_provider_version = version.into();
        self
    }

    /// Points the provider at a custom DynamoDB endpoint and skips the
    /// account checks a local endpoint cannot answer.
    pub fn with_dynamodb_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.dynamodb_endpoint = Some(endpoint.into());
        self
    }
}

/// A rendered configuration file, ready to be staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// Output of [`render`]: the artifact plus the plan with physical ids assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub artifact: Artifact,
    pub plan: Plan,
}

#[derive(Serialize)]
struct Document<'a> {
    terraform: TerraformBlock<'a>,
    provider: BTreeMap<&'static str, Vec<ProviderBlock<'a>>>,
    resource: BTreeMap<&'static str, BTreeMap<&'a str, TableResource<'a>>>,
}

#[derive(Serialize)]
struct TerraformBlock<'a> {
    required_providers: BTreeMap<&'static str, RequiredProvider<'a>>,
    backend: BTreeMap<&'static str, LocalBackend<'a>>,
}

#[derive(Serialize)]
struct RequiredProvider<'a> {
    source: &'static str,
    version: &'a str,
}

#[derive(Serialize)]
struct LocalBackend<'a> {
    path: &'a Path,
}

#[derive(Serialize)]
struct ProviderBlock<'a> {
    region: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    endpoints: Vec<EndpointsBlock<'a>>,
    #[serde(skip_serializing_if = "is_false")]
    skip_credentials_validation: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_metadata_api_check: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_requesting_account_id: bool,
}

#[derive(Serialize)]
struct EndpointsBlock<'a> {
    dynamodb: &'a str,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Serialize)]
struct TableResource<'a> {
    name: &'a str,
    billing_mode: BillingMode,
    hash_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    range_key: Option<&'a str>,
    attribute: Vec<AttributeBlock<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    global_secondary_index: Vec<IndexBlock<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    local_secondary_index: Vec<IndexBlock<'a>>,
    replica: Vec<ReplicaBlock<'a>>,
    stream_enabled: bool,
    stream_view_type: StreamViewType,
}

#[derive(Serialize)]
struct AttributeBlock<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: AttributeType,
}

/// A `global_secondary_index` or `local_secondary_index` block. Local
/// indexes inherit the table hash key and omit `hash_key`.
#[derive(Serialize)]
struct IndexBlock<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    range_key: Option<&'a str>,
    projection_type: &'static str,
    #[serde(skip_serializing_if = "no_attributes")]
    non_key_attributes: &'a [String],
}

fn no_attributes(attributes: &&[String]) -> bool {
    attributes.is_empty()
}

impl<'a> IndexBlock<'a> {
    fn global(index: &'a SecondaryIndex) -> Self {
        Self {
            hash_key: Some(&index.hash_key),
            ..Self::local(index)
        }
    }

    fn local(index: &'a SecondaryIndex) -> Self {
        Self {
            name: &index.name,
            hash_key: None,
            range_key: index.range_key.as_deref(),
            projection_type: index.projection.code(),
            non_key_attributes: index.projection.non_key_attributes(),
        }
    }
}

#[derive(Serialize)]
struct ReplicaBlock<'a> {
    region_name: &'a str,
}

/// Pure function: render the whole plan into one Terraform JSON document.
///
/// Any invalid entry fails the whole render. The engine consumes the
/// document as a single artifact, so a partial render is never produced.
pub fn render(plan: &Plan, options: &RenderOptions) -> Result<Rendered, RenderError> {
    let mut tables = BTreeMap::new();

    for entry in plan.entries() {
        let description = &entry.description;

        validate_schema(Schema {
            attributes: &description.attributes,
            hash_key: &description.hash_key,
            range_key: description.range_key.as_deref(),
            global_indexes: &description.global_indexes,
            local_indexes: &description.local_indexes,
        })
        .map_err(|source| RenderError::InvalidDescription {
            table_name: description.table_name.clone(),
            source,
        })?;

        if description.replica_regions.is_empty() {
            return Err(RenderError::EmptyReplicaSet(
                description.table_name.clone(),
            ));
        }

        let resource = TableResource {
            name: &description.table_name,
            billing_mode: description.billing_mode,
            hash_key: &description.hash_key,
            range_key: description.range_key.as_deref(),
            attribute: description
                .attributes
                .iter()
                .map(|a| AttributeBlock {
                    name: &a.name,
                    kind: a.attribute_type,
                })
                .collect(),
            global_secondary_index: description
                .global_indexes
                .iter()
                .map(IndexBlock::global)
                .collect(),
            local_secondary_index: description
                .local_indexes
                .iter()
                .map(IndexBlock::local)
                .collect(),
            replica: description
                .replica_regions
                .iter()
                .map(|r| ReplicaBlock {
                    region_name: r.as_str(),
                })
                .collect(),
            stream_enabled: description.stream.enabled,
            stream_view_type: description.stream.view_type,
        };

        if tables.insert(entry.logical_id.as_str(), resource).is_some() {
            return Err(RenderError::DuplicateLogicalId(
                entry.logical_id.to_string(),
            ));
        }
    }

    let document = Document {
        terraform: TerraformBlock {
            required_providers: BTreeMap::from([(
                "aws",
                RequiredProvider {
                    source: "hashicorp/aws",
                    version: &options.aws_provider_version,
                },
            )]),
            backend: BTreeMap::from([(
                "local",
                LocalBackend {
                    path: &options.state_path,
                },
            )]),
        },
        provider: BTreeMap::from([("aws", vec![provider_block(options)])]),
        resource: BTreeMap::from([(TABLE_RESOURCE_TYPE, tables)]),
    };

    let mut contents = serde_json::to_string_pretty(&document)
        .map_err(|e| RenderError::Serialization(e.to_string()))?;
    contents.push('\n');

    Ok(Rendered {
        artifact: Artifact {
            file_name: ARTIFACT_FILE_NAME.to_string(),
            contents,
        },
        plan: plan.clone().with_physical_ids(),
    })
}

fn provider_block(options: &RenderOptions) -> ProviderBlock<'_> {
    let local = options.dynamodb_endpoint.is_some();
    ProviderBlock {
        region: options.provider_region.as_str(),
        endpoints: options
            .dynamodb_endpoint
            .as_deref()
            .map(|dynamodb| EndpointsBlock { dynamodb })
            .into_iter()
            .collect(),
        skip_credentials_validation: local,
        skip_metadata_api_check: local,
        skip_requesting_account_id: local,
    }
}
