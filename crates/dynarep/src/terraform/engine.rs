use std::collections::BTreeSet;
use std::path::PathBuf;

use async_trait::async_trait;
use dynarep_core::provisioning::{EngineError, ImportStatus, ProvisioningEngine, WorkingArea};
use dynarep_core::replication::{Artifact, ResourceAddress};

use super::commands::{
    command_failed, import_args, init_args, is_already_managed, is_missing_state,
    parse_state_list, run_terraform, state_list_args,
};
use super::staging::stage_artifact;

/// Where and how terraform runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformConfig {
    /// Terraform executable name or path.
    pub binary: String,
    /// Directory replaced on every run.
    pub working_dir: PathBuf,
    /// Provider lock file copied into every fresh working area.
    pub lock_file: Option<PathBuf>,
    /// Shared provider cache (`TF_PLUGIN_CACHE_DIR`).
    pub plugin_cache_dir: Option<PathBuf>,
}

/// Provisioning engine that shells out to the terraform CLI.
#[derive(Debug, Clone)]
pub struct TerraformEngine {
    config: TerraformConfig,
}

impl TerraformEngine {
    pub fn new(config: TerraformConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvisioningEngine for TerraformEngine {
    async fn stage(&self, artifact: &Artifact) -> Result<WorkingArea, EngineError> {
        Ok(stage_artifact(
            &self.config.working_dir,
            artifact,
            self.config.lock_file.as_deref(),
        )
        .await?)
    }

    async fn initialize(&self, area: &WorkingArea) -> Result<(), EngineError> {
        let args = init_args();
        let output = run_terraform(&self.config, area, &args).await?;
        if !output.status.success() {
            return Err(command_failed(&self.config.binary, &args, &output).into());
        }
        Ok(())
    }

    async fn managed_addresses(
        &self,
        area: &WorkingArea,
    ) -> Result<BTreeSet<ResourceAddress>, EngineError> {
        let args = state_list_args();
        let output = run_terraform(&self.config, area, &args).await?;

        if !output.status.success() {
            if is_missing_state(&String::from_utf8_lossy(&output.stderr)) {
                return Ok(BTreeSet::new());
            }
            return Err(command_failed(&self.config.binary, &args, &output).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_state_list(&stdout)
            .into_iter()
            .map(ResourceAddress::from_state)
            .collect())
    }

    async fn import_resource(
        &self,
        area: &WorkingArea,
        address: &ResourceAddress,
        external_id: &str,
    ) -> Result<ImportStatus, EngineError> {
        let args = import_args(address, external_id);
        let output = run_terraform(&self.config, area, &args).await?;

        if output.status.success() {
            return Ok(ImportStatus::Imported);
        }
        if is_already_managed(&String::from_utf8_lossy(&output.stderr)) {
            return Ok(ImportStatus::AlreadyManaged);
        }
        Err(command_failed(&self.config.binary, &args, &output).into())
    }
}
