//! Adoption of existing tables into engine-managed state.

use crate::replication::{render, Plan, RenderOptions};

use super::error::{ReconcileError, Result};
use super::outcome::{Outcome, TableOutcome};
use super::traits::{ImportStatus, ProvisioningEngine};

/// Renders the plan, stages it, initializes the engine and adopts every table.
///
/// Returns one `(table, outcome)` per plan entry, in plan order. Managed
/// state is listed once after initialization and tables already in it are
/// reported without an import. Render, stage and initialize failures abort
/// the run. Import failures are recorded for their table and the loop moves
/// on. An empty plan touches nothing and yields no outcomes.
pub async fn reconcile<E>(
    engine: &E,
    plan: &Plan,
    options: &RenderOptions,
) -> Result<Vec<TableOutcome>>
where
    E: ProvisioningEngine + ?Sized,
{
    if plan.is_empty() {
        tracing::info!("Plan is empty, nothing to adopt");
        return Ok(Vec::new());
    }

    let rendered = render(plan, options)?;
    tracing::debug!(
        file = %rendered.artifact.file_name,
        bytes = rendered.artifact.contents.len(),
        "Rendered configuration"
    );

    let area = engine
        .stage(&rendered.artifact)
        .await
        .map_err(ReconcileError::Stage)?;
    tracing::info!(path = %area.root().display(), "Staged working area");

    engine
        .initialize(&area)
        .await
        .map_err(ReconcileError::Initialize)?;
    tracing::info!("Engine initialized");

    let managed = match engine.managed_addresses(&area).await {
        Ok(managed) => Some(managed),
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Could not read managed state, attempting every import"
            );
            None
        }
    };

    let mut outcomes = Vec::with_capacity(rendered.plan.len());

    for entry in rendered.plan.entries() {
        let table_name = entry.table_name();
        let Some(address) = &entry.physical_id else {
            tracing::warn!(table = %table_name, "Entry has no physical id, skipping import");
            continue;
        };

        if managed.as_ref().is_some_and(|m| m.contains(address)) {
            tracing::info!(table = %table_name, %address, "Table is already managed");
            outcomes.push(TableOutcome::new(
                table_name,
                Outcome::AlreadyManaged(address.clone()),
            ));
            continue;
        }

        tracing::info!(table = %table_name, %address, "Importing table");
        let outcome = match engine.import_resource(&area, address, table_name).await {
            Ok(ImportStatus::Imported) => Outcome::Imported(address.clone()),
            Ok(ImportStatus::AlreadyManaged) => Outcome::AlreadyManaged(address.clone()),
            Err(error) => {
                tracing::error!(table = %table_name, error = %error, "Import failed");
                Outcome::ImportFailed(error.to_string())
            }
        };
        outcomes.push(TableOutcome::new(table_name, outcome));
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioning::testing::{table, EngineCall, FakeEngine};
    use crate::provisioning::EngineError;
    use crate::replication::{build_entry, Region, RegionSet, RenderError};

    fn options() -> RenderOptions {
        RenderOptions::new(Region::parse("eu-west-1").unwrap(), "/state/terraform.tfstate")
    }

    fn plan_for(names: &[&str]) -> Plan {
        let requested: RegionSet = [Region::parse("us-east-1").unwrap()].into_iter().collect();
        let mut plan = Plan::new();
        for name in names {
            plan.push(build_entry(&table(name), &requested)).unwrap();
        }
        plan
    }

    fn names_and_outcomes(outcomes: &[TableOutcome]) -> Vec<(&str, bool)> {
        outcomes
            .iter()
            .map(|o| (o.table_name.as_str(), matches!(o.outcome, Outcome::Imported(_))))
            .collect()
    }

    #[tokio::test]
    async fn test_imports_every_table_in_order() {
        let engine = FakeEngine::new();

        let outcomes = reconcile(&engine, &plan_for(&["Orders", "Users"]), &options())
            .await
            .unwrap();

        assert_eq!(
            names_and_outcomes(&outcomes),
            vec![("Orders", true), ("Users", true)]
        );
        assert_eq!(
            engine.imports().await,
            vec![
                ("aws_dynamodb_table.Orders".to_string(), "Orders".to_string()),
                ("aws_dynamodb_table.Users".to_string(), "Users".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stages_before_initializing() {
        let engine = FakeEngine::new();

        reconcile(&engine, &plan_for(&["Orders"]), &options())
            .await
            .unwrap();

        let calls = engine.calls().await;
        assert!(matches!(calls[0], EngineCall::Stage(ref file) if file == "main.tf.json"));
        assert_eq!(calls[1], EngineCall::Initialize);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_imports() {
        let engine = FakeEngine::new().failing_import("Orders");

        let outcomes = reconcile(&engine, &plan_for(&["Orders", "Users"]), &options())
            .await
            .unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::ImportFailed(_)));
        assert!(matches!(outcomes[1].outcome, Outcome::Imported(_)));
        assert_eq!(engine.imports().await.len(), 2);
    }

    #[tokio::test]
    async fn test_second_run_reports_already_managed() {
        let engine = FakeEngine::new();
        let plan = plan_for(&["Orders"]);

        reconcile(&engine, &plan, &options()).await.unwrap();
        let second = reconcile(&engine, &plan, &options()).await.unwrap();

        assert!(matches!(second[0].outcome, Outcome::AlreadyManaged(_)));
        assert_eq!(engine.imports().await.len(), 1);
        assert_eq!(engine.managed_count().await, 1);
    }

    #[tokio::test]
    async fn test_import_detecting_existing_state_is_already_managed() {
        let engine = FakeEngine::new().with_broken_state_listing();
        let plan = plan_for(&["Orders"]);

        reconcile(&engine, &plan, &options()).await.unwrap();
        let second = reconcile(&engine, &plan, &options()).await.unwrap();

        assert!(matches!(second[0].outcome, Outcome::AlreadyManaged(_)));
        assert_eq!(engine.managed_count().await, 1);
    }

    #[tokio::test]
    async fn test_managed_state_is_listed_once_per_run() {
        let engine = FakeEngine::new();

        reconcile(&engine, &plan_for(&["Orders", "Users", "Events"]), &options())
            .await
            .unwrap();

        let calls = engine.calls().await;
        let listings = calls.iter().filter(|c| **c == EngineCall::ListManaged).count();
        assert_eq!(listings, 1);
        assert_eq!(calls[2], EngineCall::ListManaged);
        assert_eq!(engine.imports().await.len(), 3);
    }

    #[tokio::test]
    async fn test_rerun_with_partial_state_imports_only_new_tables() {
        let engine = FakeEngine::new();
        reconcile(&engine, &plan_for(&["Orders"]), &options())
            .await
            .unwrap();

        let second = reconcile(&engine, &plan_for(&["Orders", "Users"]), &options())
            .await
            .unwrap();

        assert!(matches!(second[0].outcome, Outcome::AlreadyManaged(_)));
        assert!(matches!(second[1].outcome, Outcome::Imported(_)));
        assert_eq!(engine.imports().await.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_plan_touches_nothing() {
        let engine = FakeEngine::new();

        let outcomes = reconcile(&engine, &Plan::new(), &options()).await.unwrap();

        assert!(outcomes.is_empty());
        assert!(engine.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_aborts_before_engine() {
        let engine = FakeEngine::new();
        let mut broken = build_entry(&table("Orders"), &RegionSet::new());
        broken.description.replica_regions = RegionSet::new();
        let mut plan = Plan::new();
        plan.push(broken).unwrap();

        let result = reconcile(&engine, &plan, &options()).await;

        assert_eq!(
            result,
            Err(ReconcileError::Render(RenderError::EmptyReplicaSet(
                "Orders".to_string()
            )))
        );
        assert!(engine.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_failure_aborts_before_imports() {
        let engine = FakeEngine::new().failing_initialize();

        let result = reconcile(&engine, &plan_for(&["Orders"]), &options()).await;

        assert!(matches!(
            result,
            Err(ReconcileError::Initialize(EngineError::CommandFailed { .. }))
        ));
        assert!(engine.imports().await.is_empty());
    }

    #[tokio::test]
    async fn test_stage_failure_aborts() {
        let engine = FakeEngine::new().failing_stage();

        let result = reconcile(&engine, &plan_for(&["Orders"]), &options()).await;

        assert!(matches!(result, Err(ReconcileError::Stage(_))));
        assert!(!engine.calls().await.contains(&EngineCall::Initialize));
    }
}
