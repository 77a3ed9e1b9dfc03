//! Replication plan types and the pure plan builder (Functional Core).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::region::RegionSet;
use super::table::{AttributeDefinition, SecondaryIndex, TableMetadata};

/// Terraform resource type every plan entry renders to.
pub const TABLE_RESOURCE_TYPE: &str = "aws_dynamodb_table";

/// What a stream record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamViewType {
    NewAndOldImages,
}

/// Stream settings for a replicated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpecification {
    pub enabled: bool,
    pub view_type: StreamViewType,
}

impl StreamSpecification {
    /// Global tables require streams carrying both item images.
    pub fn replication() -> Self {
        Self {
            enabled: true,
            view_type: StreamViewType::NewAndOldImages,
        }
    }
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    PayPerRequest,
}

/// Desired state of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescription {
    pub table_name: String,
    pub attributes: Vec<AttributeDefinition>,
    pub hash_key: String,
    pub range_key: Option<String>,
    pub global_indexes: Vec<SecondaryIndex>,
    pub local_indexes: Vec<SecondaryIndex>,
    pub replica_regions: RegionSet,
    pub stream: StreamSpecification,
    pub billing_mode: BillingMode,
}

/// The name the declarative description uses for a resource.
///
/// Derived from the table name: characters outside `[A-Za-z0-9_-]` become
/// `_`, and a leading digit is prefixed with `_`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn from_table_name(table_name: &str) -> Self {
        let mut id: String = table_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if !id.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            id.insert(0, '_');
        }

        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine address of a rendered resource, e.g. `aws_dynamodb_table.Orders`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceAddress(String);

impl ResourceAddress {
    pub fn for_table(logical_id: &LogicalId) -> Self {
        Self(format!("{}.{}", TABLE_RESOURCE_TYPE, logical_id))
    }

    /// Wraps an address as the engine reports it from its state.
    pub fn from_state(address: &str) -> Self {
        Self(address.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computed desired state for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub description: ResourceDescription,
    /// Replica regions the table already had when it was inspected.
    pub existing_replica_regions: RegionSet,
    pub logical_id: LogicalId,
    /// Set once the plan has been rendered.
    pub physical_id: Option<ResourceAddress>,
}

impl PlanEntry {
    pub fn table_name(&self) -> &str {
        &self.description.table_name
    }
}

/// Ordered collection of plan entries, in source table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    entries: Vec<PlanEntry>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Returns the entry back if its logical id is taken.
    pub fn push(&mut self, entry: PlanEntry) -> Result<(), PlanEntry> {
        if self.contains_logical_id(&entry.logical_id) {
            return Err(entry);
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains_logical_id(&self, logical_id: &LogicalId) -> bool {
        self.entries.iter().any(|e| &e.logical_id == logical_id)
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the plan and returns a copy whose entries carry their engine addresses.
    pub fn with_physical_ids(self) -> Plan {
        let entries = self
            .entries
            .into_iter()
            .map(|mut entry| {
                entry.physical_id = Some(ResourceAddress::for_table(&entry.logical_id));
                entry
            })
            .collect();
        Plan { entries }
    }
}

/// Pure function: build the desired state for one table.
///
/// The replica set is `existing ∪ targets`. Streams (new and old images) and
/// on-demand billing are fixed policy.
pub fn build_entry(metadata: &TableMetadata, target_regions: &RegionSet) -> PlanEntry {
    PlanEntry {
        description: ResourceDescription {
            table_name: metadata.name.clone(),
            attributes: metadata.attributes.clone(),
            hash_key: metadata.hash_key.clone(),
            range_key: metadata.range_key.clone(),
            global_indexes: metadata.global_indexes.clone(),
            local_indexes: metadata.local_indexes.clone(),
            replica_regions: metadata.existing_replica_regions.union(target_regions),
            stream: StreamSpecification::replication(),
            billing_mode: BillingMode::PayPerRequest,
        },
        existing_replica_regions: metadata.existing_replica_regions.clone(),
        logical_id: LogicalId::from_table_name(&metadata.name),
        physical_id: None,
    }
}

/// Pure function: format a plan for display.
pub fn format_plan(plan: &Plan) -> Vec<String> {
    if plan.is_empty() {
        return vec!["= No tables to replicate".to_string()];
    }

    let mut lines = Vec::new();
    for entry in plan.entries() {
        let description = &entry.description;
        lines.push(format!(
            "~ Adopt table: {} (as {})",
            description.table_name, entry.logical_id
        ));
        lines.push(format!("  Hash key: {}", description.hash_key));
        if let Some(range_key) = &description.range_key {
            lines.push(format!("  Range key: {}", range_key));
        }
        for index in &description.global_indexes {
            lines.push(format!("  Global index: {}", index_summary(index)));
        }
        for index in &description.local_indexes {
            lines.push(format!("  Local index: {}", index_summary(index)));
        }
        for region in &description.replica_regions {
            if entry.existing_replica_regions.contains(region) {
                lines.push(format!("  = Replica: {}", region));
            } else {
                lines.push(format!("  + Replica: {}", region));
            }
        }
        lines.push("  Stream: NEW_AND_OLD_IMAGES".to_string());
        lines.push("  Billing: PAY_PER_REQUEST".to_string());
    }
    lines
}

fn index_summary(index: &SecondaryIndex) -> String {
    match &index.range_key {
        Some(range_key) => format!("{} ({}, {})", index.name, index.hash_key, range_key),
        None => format!("{} ({})", index.name, index.hash_key),
    }
}
