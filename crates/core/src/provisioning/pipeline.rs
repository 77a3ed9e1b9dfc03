//! Inspection and plan building across all requested tables.

use crate::replication::{build_entry, Plan, RegionSet, ReplicaRequest, TableMetadata};

use super::error::InspectError;
use super::outcome::{Outcome, SkipReason, TableOutcome};
use super::traits::TableInspector;

/// Result of inspecting one requested table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub table_name: String,
    pub result: Result<TableMetadata, InspectError>,
}

/// Inspects every source table in order, one at a time.
///
/// Failures stay attached to their table; the loop always visits every table.
pub async fn inspect_tables<I>(inspector: &I, request: &ReplicaRequest) -> Vec<Inspection>
where
    I: TableInspector + ?Sized,
{
    let mut inspections = Vec::with_capacity(request.source_tables.len());

    for table_name in &request.source_tables {
        tracing::debug!(table = %table_name, "Inspecting table");
        let result = inspector.inspect(table_name).await;
        inspections.push(Inspection {
            table_name: table_name.clone(),
            result,
        });
    }

    inspections
}

/// Pure function: turn inspection results into a plan plus the tables that were skipped.
pub fn build_plan(
    inspections: Vec<Inspection>,
    target_regions: &RegionSet,
) -> (Plan, Vec<TableOutcome>) {
    let mut plan = Plan::new();
    let mut skipped = Vec::new();

    for inspection in inspections {
        let table_name = inspection.table_name;

        let metadata = match inspection.result {
            Ok(metadata) => metadata,
            Err(error) => {
                log_skip(&table_name, &error);
                let reason = match error {
                    InspectError::NotFound { .. } => SkipReason::NotFound,
                    InspectError::Query { message, .. } => SkipReason::QueryFailed(message),
                    InspectError::Metadata { source, .. } => SkipReason::InvalidMetadata(source),
                };
                skipped.push(TableOutcome::new(table_name, Outcome::Skipped(reason)));
                continue;
            }
        };

        if let Err(error) = metadata.validate() {
            tracing::warn!(table = %table_name, error = %error, "Skipping table with invalid metadata");
            skipped.push(TableOutcome::new(
                table_name,
                Outcome::Skipped(SkipReason::InvalidMetadata(error)),
            ));
            continue;
        }

        if let Err(rejected) = plan.push(build_entry(&metadata, target_regions)) {
            tracing::warn!(
                table = %table_name,
                logical_id = %rejected.logical_id,
                "Skipping table whose logical id collides with an earlier table"
            );
            skipped.push(TableOutcome::new(
                table_name,
                Outcome::Skipped(SkipReason::DuplicateLogicalId(
                    rejected.logical_id.to_string(),
                )),
            ));
        }
    }

    (plan, skipped)
}

/// Inspects every requested table and builds the aggregate plan.
pub async fn plan_replication<I>(inspector: &I, request: &ReplicaRequest) -> (Plan, Vec<TableOutcome>)
where
    I: TableInspector + ?Sized,
{
    let inspections = inspect_tables(inspector, request).await;
    build_plan(inspections, &request.target_regions)
}

fn log_skip(table_name: &str, error: &InspectError) {
    match error {
        InspectError::NotFound { .. } => {
            tracing::warn!(table = %table_name, "Table does not exist. Create the table first");
        }
        InspectError::Query { message, .. } => {
            tracing::error!(
                table = %table_name,
                error = %message,
                "Unknown error while querying table metadata"
            );
        }
        InspectError::Metadata { source, .. } => {
            tracing::warn!(table = %table_name, error = %source, "Skipping table with unusable metadata");
        }
    }
}
