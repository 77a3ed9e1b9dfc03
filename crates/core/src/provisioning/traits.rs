use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::replication::{Artifact, ResourceAddress, TableMetadata};

use super::error::{EngineError, InspectError};

/// Reads live table metadata.
#[async_trait]
pub trait TableInspector: Send + Sync {
    /// Fetches the schema, key and replica regions of one table.
    ///
    /// Has no side effects beyond the read-only query.
    async fn inspect(&self, table_name: &str) -> Result<TableMetadata, InspectError>;
}

/// Directory an engine runs in for a single reconcile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingArea {
    root: PathBuf,
}

impl WorkingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// How an adoption ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// The resource was bound to managed state by this call.
    Imported,
    /// The resource was already in managed state; nothing changed.
    AlreadyManaged,
}

/// Declarative engine that adopts existing resources.
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Discards any previous working area and writes the artifact into a fresh one.
    async fn stage(&self, artifact: &Artifact) -> Result<WorkingArea, EngineError>;

    /// Prepares the staged area for use. Safe to repeat.
    async fn initialize(&self, area: &WorkingArea) -> Result<(), EngineError>;

    /// Lists every address currently in managed state. Empty when no state exists yet.
    async fn managed_addresses(
        &self,
        area: &WorkingArea,
    ) -> Result<BTreeSet<ResourceAddress>, EngineError>;

    /// Binds the existing resource named `external_id` to `address`.
    async fn import_resource(
        &self,
        area: &WorkingArea,
        address: &ResourceAddress,
        external_id: &str,
    ) -> Result<ImportStatus, EngineError>;
}
