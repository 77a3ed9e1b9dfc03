//! In-memory collaborators for tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::replication::{
    Artifact, AttributeDefinition, AttributeType, ResourceAddress, TableMetadata,
};

use super::error::{EngineError, InspectError};
use super::traits::{ImportStatus, ProvisioningEngine, TableInspector, WorkingArea};

/// A valid table with a single string hash key named `id`.
pub fn table(name: &str) -> TableMetadata {
    TableMetadata::new(
        name,
        vec![AttributeDefinition::new("id", AttributeType::String)],
        "id",
    )
}

/// Inspector backed by a map; unknown tables are `NotFound`.
#[derive(Debug, Default)]
pub struct FakeInspector {
    tables: HashMap<String, Result<TableMetadata, InspectError>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl FakeInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, metadata: TableMetadata) -> Self {
        self.tables.insert(metadata.name.clone(), Ok(metadata));
        self
    }

    pub fn with_query_error(mut self, table_name: &str, message: &str) -> Self {
        self.tables.insert(
            table_name.to_string(),
            Err(InspectError::Query {
                table_name: table_name.to_string(),
                message: message.to_string(),
            }),
        );
        self
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl TableInspector for FakeInspector {
    async fn inspect(&self, table_name: &str) -> Result<TableMetadata, InspectError> {
        self.calls.write().await.push(table_name.to_string());
        self.tables
            .get(table_name)
            .cloned()
            .unwrap_or_else(|| {
                Err(InspectError::NotFound {
                    table_name: table_name.to_string(),
                })
            })
    }
}

/// Engine call log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Stage(String),
    Initialize,
    ListManaged,
    Import(String, String),
}

/// Engine that keeps managed state in memory across runs.
#[derive(Debug, Default)]
pub struct FakeEngine {
    managed: Arc<RwLock<HashSet<ResourceAddress>>>,
    calls: Arc<RwLock<Vec<EngineCall>>>,
    failing_imports: HashSet<String>,
    fail_stage: bool,
    fail_initialize: bool,
    broken_state_listing: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports of this table always fail.
    pub fn failing_import(mut self, table_name: &str) -> Self {
        self.failing_imports.insert(table_name.to_string());
        self
    }

    pub fn failing_stage(mut self) -> Self {
        self.fail_stage = true;
        self
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// `managed_addresses` errors, so only the import itself can notice existing state.
    pub fn with_broken_state_listing(mut self) -> Self {
        self.broken_state_listing = true;
        self
    }

    pub async fn calls(&self) -> Vec<EngineCall> {
        self.calls.read().await.clone()
    }

    /// `(address, external id)` for every import attempt.
    pub async fn imports(&self) -> Vec<(String, String)> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                EngineCall::Import(address, id) => Some((address.clone(), id.clone())),
                _ => None,
            })
            .collect()
    }

    pub async fn managed_count(&self) -> usize {
        self.managed.read().await.len()
    }
}

#[async_trait]
impl ProvisioningEngine for FakeEngine {
    async fn stage(&self, artifact: &Artifact) -> Result<WorkingArea, EngineError> {
        self.calls
            .write()
            .await
            .push(EngineCall::Stage(artifact.file_name.clone()));
        if self.fail_stage {
            return Err(EngineError::WorkingArea("disk full".to_string()));
        }
        Ok(WorkingArea::new("/tmp/fake-area"))
    }

    async fn initialize(&self, _area: &WorkingArea) -> Result<(), EngineError> {
        self.calls.write().await.push(EngineCall::Initialize);
        if self.fail_initialize {
            return Err(EngineError::CommandFailed {
                command: "init".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "provider download failed".to_string(),
            });
        }
        Ok(())
    }

    async fn managed_addresses(
        &self,
        _area: &WorkingArea,
    ) -> Result<BTreeSet<ResourceAddress>, EngineError> {
        self.calls.write().await.push(EngineCall::ListManaged);
        if self.broken_state_listing {
            return Err(EngineError::Spawn {
                command: "state list".to_string(),
                message: "unavailable".to_string(),
            });
        }
        Ok(self.managed.read().await.iter().cloned().collect())
    }

    async fn import_resource(
        &self,
        _area: &WorkingArea,
        address: &ResourceAddress,
        external_id: &str,
    ) -> Result<ImportStatus, EngineError> {
        self.calls.write().await.push(EngineCall::Import(
            address.to_string(),
            external_id.to_string(),
        ));

        if self.failing_imports.contains(external_id) {
            return Err(EngineError::CommandFailed {
                command: format!("import {}", address),
                status: "exit status: 1".to_string(),
                stderr: "Cannot import non-existent remote object".to_string(),
            });
        }

        if self.managed.write().await.insert(address.clone()) {
            Ok(ImportStatus::Imported)
        } else {
            Ok(ImportStatus::AlreadyManaged)
        }
    }
}
