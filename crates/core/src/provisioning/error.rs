use thiserror::Error;

use crate::replication::{MetadataError, RenderError};

/// Per-table failures of the metadata query. None of these abort a run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InspectError {
    #[error("Table '{table_name}' does not exist. Create the table first")]
    NotFound { table_name: String },
    #[error("Metadata query for table '{table_name}' failed: {message}")]
    Query { table_name: String, message: String },
    #[error("Table '{table_name}' has unusable metadata: {source}")]
    Metadata {
        table_name: String,
        source: MetadataError,
    },
}

impl InspectError {
    pub fn table_name(&self) -> &str {
        match self {
            InspectError::NotFound { table_name }
            | InspectError::Query { table_name, .. }
            | InspectError::Metadata { table_name, .. } => table_name,
        }
    }
}

/// Failures reported by a provisioning engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Working area error: {0}")]
    WorkingArea(String),
    #[error("Failed to run '{command}': {message}")]
    Spawn { command: String, message: String },
    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Fatal failures that abort a reconcile run before or instead of the import loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
    #[error("Staging failed: {0}")]
    Stage(EngineError),
    #[error("Initialization failed: {0}")]
    Initialize(EngineError),
}

/// Result type for reconcile runs.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = InspectError::NotFound {
            table_name: "Missing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Table 'Missing' does not exist. Create the table first"
        );
        assert_eq!(error.table_name(), "Missing");
    }

    #[test]
    fn test_command_failed_display() {
        let error = EngineError::CommandFailed {
            command: "terraform init".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "no provider".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "'terraform init' exited with exit status: 1: no provider"
        );
    }

    #[test]
    fn test_reconcile_error_display() {
        let error = ReconcileError::Initialize(EngineError::WorkingArea("gone".to_string()));
        assert_eq!(
            error.to_string(),
            "Initialization failed: Working area error: gone"
        );
    }
}
