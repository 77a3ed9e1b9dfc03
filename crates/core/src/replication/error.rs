use thiserror::Error;

/// Errors that can occur when parsing a region identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("Region cannot be empty")]
    Empty,
    #[error("Malformed region '{0}' (expected a lowercase identifier like us-east-1)")]
    Malformed(String),
}

/// Errors that can occur when parsing a replica request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("At least one target region is required")]
    NoTargetRegions,
    #[error("At least one source table is required")]
    NoSourceTables,
    #[error("Table '{0}' was listed more than once")]
    DuplicateTable(String),
    #[error(transparent)]
    Region(#[from] RegionError),
}

/// Errors that make table metadata unusable for planning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Table has no attribute definitions")]
    NoAttributes,
    #[error("Table has no hash key")]
    MissingHashKey,
    #[error("Key attribute '{0}' has no attribute definition")]
    UndefinedKeyAttribute(String),
    #[error("Unsupported attribute type '{kind}' for attribute '{attribute}'")]
    UnsupportedAttributeType { attribute: String, kind: String },
    #[error("Attribute '{0}' is not used by the table key or any index key")]
    UnindexedAttribute(String),
    #[error("Secondary index has no name")]
    UnnamedIndex,
    #[error("Index '{0}' has no hash key")]
    IndexMissingHashKey(String),
    #[error("Local index '{0}' must use the table hash key and have a range key")]
    InvalidLocalIndex(String),
    #[error("Unsupported projection '{kind}' for index '{index}'")]
    UnsupportedProjection { index: String, kind: String },
    #[error("Invalid replica region: {0}")]
    Region(#[from] RegionError),
}

/// Errors that can occur while rendering a plan into engine configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid resource description for table '{table_name}': {source}")]
    InvalidDescription {
        table_name: String,
        source: MetadataError,
    },
    #[error("Table '{0}' has an empty replica set")]
    EmptyReplicaSet(String),
    #[error("Logical id '{0}' is used by more than one plan entry")]
    DuplicateLogicalId(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}
