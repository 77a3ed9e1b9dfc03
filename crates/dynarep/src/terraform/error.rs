//! Error types for Terraform operations.

use std::path::PathBuf;

use dynarep_core::provisioning::EngineError;
use thiserror::Error;

/// Result type alias for terraform module.
pub type Result<T> = std::result::Result<T, TerraformError>;

/// Errors that can occur while staging or running Terraform.
#[derive(Error, Debug)]
pub enum TerraformError {
    #[error("Refusing to use '{0}' as a working area")]
    UnsafeWorkingArea(PathBuf),

    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

impl TerraformError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TerraformError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

impl From<TerraformError> for EngineError {
    fn from(err: TerraformError) -> Self {
        match err {
            TerraformError::Spawn { command, source } => EngineError::Spawn {
                command,
                message: source.to_string(),
            },
            TerraformError::CommandFailed {
                command,
                status,
                stderr,
            } => EngineError::CommandFailed {
                command,
                status: status.to_string(),
                stderr,
            },
            err @ (TerraformError::UnsafeWorkingArea(_) | TerraformError::Io { .. }) => {
                EngineError::WorkingArea(err.to_string())
            }
        }
    }
}
