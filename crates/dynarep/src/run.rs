//! A full replication run: inspect, plan, confirm, reconcile, report.

use dialoguer::Confirm;
use dynarep_core::provisioning::{
    format_report, plan_replication, reconcile, Outcome, ReconcileError, RunReport, TableOutcome,
};
use dynarep_core::replication::{format_plan, render, Plan, RenderError};
use thiserror::Error;

use crate::aws::{create_client, DynamoInspector};
use crate::config::RunConfig;
use crate::prelude::*;
use crate::terraform::TerraformEngine;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to read confirmation: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,
}

/// Runs one replication pass and returns the per-table report.
pub async fn run(config: &RunConfig, global: &crate::Global) -> Result<RunReport, RunError> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), config.aws.target_display());
        aprintln!("{} {}", p_b("Replica regions:"), config.request.target_regions);
        aprintln!(
            "{} {}",
            p_b("Tables:"),
            config.request.source_tables.join(", ")
        );
        aprintln!();
    }

    let client = create_client(&config.aws).await;
    let inspector = DynamoInspector::new(client);
    let (plan, skipped) = plan_replication(&inspector, &config.request).await;

    if !global.is_silent() {
        print_plan(&plan, &skipped);
    }

    if config.dry_run {
        if !plan.is_empty() {
            let rendered = render(&plan, &config.render)?;
            aprintln!("{}", p_c(&format!("{}:", rendered.artifact.file_name)));
            aprintln!("{}", rendered.artifact.contents);
        }
        return Ok(RunReport::assemble(
            &config.request.source_tables,
            skipped,
            Vec::new(),
        ));
    }

    if !plan.is_empty() && !config.force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Adopt {} table(s) into terraform state?",
                plan.len()
            ))
            .default(true)
            .interact()
            .map_err(|e| RunError::Prompt(e.to_string()))?;

        if !confirmed {
            return Err(RunError::UserCancelled);
        }
    }

    let engine = TerraformEngine::new(config.terraform.clone());
    let reconciled = reconcile(&engine, &plan, &config.render).await?;

    let report = RunReport::assemble(&config.request.source_tables, skipped, reconciled);

    if !global.is_silent() {
        aprintln!("{}", p_c("Results:"));
        for line in format_report(&report) {
            aprintln!("  {}", colorize_line(&line));
        }
    }

    Ok(report)
}

fn print_plan(plan: &Plan, skipped: &[TableOutcome]) {
    aprintln!("{}", p_c("Replication Plan:"));
    for line in format_plan(plan) {
        aprintln!("  {}", colorize_line(&line));
    }
    for outcome in skipped {
        if let Outcome::Skipped(reason) = &outcome.outcome {
            aprintln!(
                "  {}",
                p_y(&format!("~ Skip table: {} ({})", outcome.table_name, reason))
            );
        }
    }
    aprintln!();
}
