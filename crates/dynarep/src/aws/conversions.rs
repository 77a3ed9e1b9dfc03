//! Conversions from SDK table descriptions to core metadata.

use aws_sdk_dynamodb::types::{
    KeySchemaElement, KeyType, Projection as SdkProjection, ProjectionType, TableDescription,
};
use dynarep_core::replication::{
    AttributeDefinition, AttributeType, MetadataError, Projection, Region, RegionSet,
    SecondaryIndex, TableMetadata,
};

/// Converts a `DescribeTable` result into `TableMetadata`.
///
/// Attributes keep the order the service reports. The result is not
/// validated here; the plan builder does that for every source.
pub fn table_metadata(
    table_name: &str,
    table: &TableDescription,
) -> Result<TableMetadata, MetadataError> {
    let attributes = table
        .attribute_definitions()
        .iter()
        .map(|a| {
            let kind = a.attribute_type().as_str();
            AttributeType::from_code(kind)
                .map(|attribute_type| AttributeDefinition::new(a.attribute_name(), attribute_type))
                .ok_or_else(|| MetadataError::UnsupportedAttributeType {
                    attribute: a.attribute_name().to_string(),
                    kind: kind.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let hash_key =
        key_named(table.key_schema(), KeyType::Hash).ok_or(MetadataError::MissingHashKey)?;
    let range_key = key_named(table.key_schema(), KeyType::Range);

    let global_indexes = table
        .global_secondary_indexes()
        .iter()
        .map(|i| secondary_index(i.index_name(), i.key_schema(), i.projection()))
        .collect::<Result<Vec<_>, _>>()?;

    let local_indexes = table
        .local_secondary_indexes()
        .iter()
        .map(|i| secondary_index(i.index_name(), i.key_schema(), i.projection()))
        .collect::<Result<Vec<_>, _>>()?;

    let existing_replica_regions = table
        .replicas()
        .iter()
        .filter_map(|r| r.region_name())
        .map(Region::parse)
        .collect::<Result<RegionSet, _>>()?;

    Ok(TableMetadata {
        name: table.table_name().unwrap_or(table_name).to_string(),
        attributes,
        hash_key,
        range_key,
        global_indexes,
        local_indexes,
        existing_replica_regions,
    })
}

fn key_named(key_schema: &[KeySchemaElement], key_type: KeyType) -> Option<String> {
    key_schema
        .iter()
        .find(|k| *k.key_type() == key_type)
        .map(|k| k.attribute_name().to_string())
}

fn secondary_index(
    name: Option<&str>,
    key_schema: &[KeySchemaElement],
    projection: Option<&SdkProjection>,
) -> Result<SecondaryIndex, MetadataError> {
    let name = name.unwrap_or_default().to_string();
    let hash_key = key_named(key_schema, KeyType::Hash)
        .ok_or_else(|| MetadataError::IndexMissingHashKey(name.clone()))?;
    let projection = index_projection(&name, projection)?;

    let index = SecondaryIndex::new(name, hash_key, projection);
    Ok(match key_named(key_schema, KeyType::Range) {
        Some(range_key) => index.with_range_key(range_key),
        None => index,
    })
}

fn index_projection(
    index: &str,
    projection: Option<&SdkProjection>,
) -> Result<Projection, MetadataError> {
    let unsupported = |kind: &str| MetadataError::UnsupportedProjection {
        index: index.to_string(),
        kind: kind.to_string(),
    };

    let projection = projection.ok_or_else(|| unsupported("none"))?;
    match projection.projection_type() {
        Some(ProjectionType::All) => Ok(Projection::All),
        Some(ProjectionType::KeysOnly) => Ok(Projection::KeysOnly),
        Some(ProjectionType::Include) => {
            Ok(Projection::Include(projection.non_key_attributes().to_vec()))
        }
        Some(other) => Err(unsupported(other.as_str())),
        None => Err(unsupported("none")),
    }
}
