use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::MetadataError;
use super::region::RegionSet;

/// Scalar types a key attribute can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "S")]
    String,
    #[serde(rename = "N")]
    Number,
    #[serde(rename = "B")]
    Binary,
}

impl AttributeType {
    /// Returns the single-letter code used by DynamoDB and Terraform.
    pub fn code(&self) -> &'static str {
        match self {
            AttributeType::String => "S",
            AttributeType::Number => "N",
            AttributeType::Binary => "B",
        }
    }

    /// Parses a single-letter type code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(AttributeType::String),
            "N" => Some(AttributeType::Number),
            "B" => Some(AttributeType::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An attribute definition from a table's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }
}

/// Which attributes a secondary index copies from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    KeysOnly,
    /// Keys plus the listed non-key attributes.
    Include(Vec<String>),
}

impl Projection {
    pub fn code(&self) -> &'static str {
        match self {
            Projection::All => "ALL",
            Projection::KeysOnly => "KEYS_ONLY",
            Projection::Include(_) => "INCLUDE",
        }
    }

    pub fn non_key_attributes(&self) -> &[String] {
        match self {
            Projection::Include(attributes) => attributes,
            _ => &[],
        }
    }
}

/// A global or local secondary index.
///
/// Local indexes share the table's hash key, so only their range key and
/// projection can differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
    pub name: String,
    pub hash_key: String,
    pub range_key: Option<String>,
    pub projection: Projection,
}

impl SecondaryIndex {
    pub fn new(name: impl Into<String>, hash_key: impl Into<String>, projection: Projection) -> Self {
        Self {
            name: name.into(),
            hash_key: hash_key.into(),
            range_key: None,
            projection,
        }
    }

    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hash_key.as_str()).chain(self.range_key.as_deref())
    }
}

/// Key layout of a table: attributes, primary key and secondary indexes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Schema<'a> {
    pub attributes: &'a [AttributeDefinition],
    pub hash_key: &'a str,
    pub range_key: Option<&'a str>,
    pub global_indexes: &'a [SecondaryIndex],
    pub local_indexes: &'a [SecondaryIndex],
}

/// Read-only snapshot of a live table's schema and replica configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub name: String,
    /// Attribute definitions in the order the service reports them.
    pub attributes: Vec<AttributeDefinition>,
    pub hash_key: String,
    pub range_key: Option<String>,
    pub global_indexes: Vec<SecondaryIndex>,
    pub local_indexes: Vec<SecondaryIndex>,
    pub existing_replica_regions: RegionSet,
}

impl TableMetadata {
    /// Creates metadata for a table with a simple hash key and no replicas.
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<AttributeDefinition>,
        hash_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            hash_key: hash_key.into(),
            range_key: None,
            global_indexes: Vec::new(),
            local_indexes: Vec::new(),
            existing_replica_regions: RegionSet::new(),
        }
    }

    /// Sets the range (sort) key.
    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    pub fn with_global_index(mut self, index: SecondaryIndex) -> Self {
        self.global_indexes.push(index);
        self
    }

    pub fn with_local_index(mut self, index: SecondaryIndex) -> Self {
        self.local_indexes.push(index);
        self
    }

    /// Sets the currently configured replica regions.
    pub fn with_replicas(mut self, replicas: RegionSet) -> Self {
        self.existing_replica_regions = replicas;
        self
    }

    /// Checks that the metadata can describe a table.
    pub fn validate(&self) -> Result<(), MetadataError> {
        validate_schema(Schema {
            attributes: &self.attributes,
            hash_key: &self.hash_key,
            range_key: self.range_key.as_deref(),
            global_indexes: &self.global_indexes,
            local_indexes: &self.local_indexes,
        })
    }
}

/// Validates that a schema has attributes, that every key names one of them,
/// and that every attribute is used by some key.
///
/// Terraform refuses attribute definitions no key uses, and a local index
/// must share the table's hash key and carry its own range key.
pub(crate) fn validate_schema(schema: Schema<'_>) -> Result<(), MetadataError> {
    if schema.attributes.is_empty() {
        return Err(MetadataError::NoAttributes);
    }
    if schema.hash_key.trim().is_empty() {
        return Err(MetadataError::MissingHashKey);
    }

    for index in schema.global_indexes.iter().chain(schema.local_indexes) {
        if index.name.trim().is_empty() {
            return Err(MetadataError::UnnamedIndex);
        }
        if index.hash_key.trim().is_empty() {
            return Err(MetadataError::IndexMissingHashKey(index.name.clone()));
        }
    }

    for index in schema.local_indexes {
        if index.hash_key != schema.hash_key || index.range_key.is_none() {
            return Err(MetadataError::InvalidLocalIndex(index.name.clone()));
        }
    }

    let keys: Vec<&str> = std::iter::once(schema.hash_key)
        .chain(schema.range_key)
        .chain(
            schema
                .global_indexes
                .iter()
                .chain(schema.local_indexes)
                .flat_map(SecondaryIndex::keys),
        )
        .collect();

    for key in &keys {
        if !schema.attributes.iter().any(|a| a.name == *key) {
            return Err(MetadataError::UndefinedKeyAttribute(key.to_string()));
        }
    }

    if let Some(unused) = schema.attributes.iter().find(|a| !keys.contains(&a.name.as_str())) {
        return Err(MetadataError::UnindexedAttribute(unused.name.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> TableMetadata {
        TableMetadata::new(
            "Orders",
            vec![AttributeDefinition::new("id", AttributeType::String)],
            "id",
        )
    }

    #[test]
    fn test_valid_metadata() {
        assert_eq!(orders().validate(), Ok(()));
    }

    #[test]
    fn test_zero_attributes_is_invalid() {
        let mut metadata = orders();
        metadata.attributes.clear();
        assert_eq!(metadata.validate(), Err(MetadataError::NoAttributes));
    }

    #[test]
    fn test_empty_hash_key_is_invalid() {
        let mut metadata = orders();
        metadata.hash_key = String::new();
        assert_eq!(metadata.validate(), Err(MetadataError::MissingHashKey));
    }

    #[test]
    fn test_hash_key_must_be_defined() {
        let mut metadata = orders();
        metadata.hash_key = "pk".to_string();
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::UndefinedKeyAttribute("pk".to_string()))
        );
    }

    #[test]
    fn test_range_key_must_be_defined() {
        let metadata = orders().with_range_key("created_at");
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::UndefinedKeyAttribute("created_at".to_string()))
        );
    }

    #[test]
    fn test_composite_key_is_valid() {
        let mut metadata = orders().with_range_key("created_at");
        metadata
            .attributes
            .push(AttributeDefinition::new("created_at", AttributeType::Number));
        assert_eq!(metadata.validate(), Ok(()));
    }

    fn orders_with_indexes() -> TableMetadata {
        TableMetadata::new(
            "Orders",
            vec![
                AttributeDefinition::new("id", AttributeType::String),
                AttributeDefinition::new("sk", AttributeType::String),
                AttributeDefinition::new("customer", AttributeType::String),
                AttributeDefinition::new("status", AttributeType::String),
            ],
            "id",
        )
        .with_range_key("sk")
        .with_global_index(SecondaryIndex::new("by_customer", "customer", Projection::All))
        .with_local_index(
            SecondaryIndex::new("by_status", "id", Projection::KeysOnly).with_range_key("status"),
        )
    }

    #[test]
    fn test_index_keys_count_as_indexed() {
        assert_eq!(orders_with_indexes().validate(), Ok(()));
    }

    #[test]
    fn test_attribute_used_by_no_key_is_invalid() {
        let mut metadata = orders_with_indexes();
        metadata.global_indexes.clear();
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::UnindexedAttribute("customer".to_string()))
        );
    }

    #[test]
    fn test_index_key_must_be_defined() {
        let metadata = orders_with_indexes()
            .with_global_index(SecondaryIndex::new("by_region", "region", Projection::All));
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::UndefinedKeyAttribute("region".to_string()))
        );
    }

    #[test]
    fn test_local_index_must_share_hash_key() {
        let mut metadata = orders_with_indexes();
        metadata.local_indexes[0].hash_key = "customer".to_string();
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::InvalidLocalIndex("by_status".to_string()))
        );
    }

    #[test]
    fn test_unnamed_index_is_invalid() {
        let mut metadata = orders_with_indexes();
        metadata.global_indexes[0].name = String::new();
        assert_eq!(metadata.validate(), Err(MetadataError::UnnamedIndex));
    }

    #[test]
    fn test_projection_codes() {
        let include = Projection::Include(vec!["total".to_string()]);
        assert_eq!(include.code(), "INCLUDE");
        assert_eq!(include.non_key_attributes(), ["total".to_string()]);
        assert_eq!(Projection::KeysOnly.code(), "KEYS_ONLY");
        assert!(Projection::All.non_key_attributes().is_empty());
    }

    #[test]
    fn test_attribute_type_codes() {
        for kind in [AttributeType::String, AttributeType::Number, AttributeType::Binary] {
            assert_eq!(AttributeType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(AttributeType::from_code("SS"), None);
    }
}
