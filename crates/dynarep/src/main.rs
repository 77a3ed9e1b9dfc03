//! dynarep adds cross-region replicas to existing DynamoDB tables and adopts
//! the tables into Terraform state without recreating them.

mod aws;
mod config;
mod prelude;
mod run;
mod terraform;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Inputs, ReplicateArgs, RunConfig};
use crate::prelude::*;

/// Replicate existing DynamoDB tables to new regions and adopt them into Terraform state
#[derive(Debug, Parser)]
#[command(name = "dynarep")]
#[command(version, about, long_about = "Replicate existing DynamoDB tables to new regions.

For every source table, dynarep reads the live schema and replica regions,
merges in the requested regions, renders a Terraform configuration for the
resulting global table and imports the existing table into Terraform state.
Tables are never recreated; run `terraform apply` in the working directory
afterwards to create the new replicas.

Missing --regions, --tables or --region values are prompted for.

Environment variables:
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - Region the tables live in
  AWS_PROFILE         - AWS profile to use for credentials
  RUST_LOG            - Override the log filter")]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(flatten)]
    args: ReplicateArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn default_log_filter(&self) -> &'static str {
        if self.is_verbose() {
            "dynarep=debug,dynarep_core=debug"
        } else if self.is_silent() {
            "dynarep=warn,dynarep_core=warn"
        } else {
            "dynarep=info,dynarep_core=info"
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.global.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let inputs = Inputs::collect(&cli.args)?;
    let config = RunConfig::build(&inputs, &cli.args, &cwd)?;

    tracing::debug!(?config, "Resolved run configuration");

    let report = run::run(&config, &cli.global)
        .await
        .context("Replication run aborted")?;

    if config.strict && !report.is_clean() {
        bail!(
            "{} of {} table(s) did not end up managed",
            report.skipped() + report.failed(),
            report.outcomes().len()
        );
    }

    if !cli.global.is_silent() && !config.dry_run && report.imported() > 0 {
        aprintln!();
        aprintln!(
            "{} run `terraform apply` in {} to create the new replicas.",
            p_g("Done:"),
            config.terraform.working_dir.display()
        );
    }

    Ok(())
}
