mod error;
mod plan;
mod region;
mod render;
mod request;
mod table;

pub use error::{MetadataError, RegionError, RenderError, RequestError};
pub use plan::{
    build_entry, format_plan, BillingMode, LogicalId, Plan, PlanEntry, ResourceAddress,
    ResourceDescription, StreamSpecification, StreamViewType, TABLE_RESOURCE_TYPE,
};
pub use region::{Region, RegionSet};
pub use render::{
    render, Artifact, RenderOptions, Rendered, ARTIFACT_FILE_NAME, DEFAULT_AWS_PROVIDER_VERSION,
};
pub use request::{split_list, ReplicaRequest};
pub use table::{AttributeDefinition, AttributeType, Projection, SecondaryIndex, TableMetadata};
