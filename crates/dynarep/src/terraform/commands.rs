//! Terraform command construction and output interpretation.
//!
//! Pure functions build argument lists and classify command output. The
//! single I/O function, [`run_terraform`], executes one command inside a
//! working area and captures its output.

use std::process::{Output, Stdio};

use dynarep_core::provisioning::WorkingArea;
use dynarep_core::replication::ResourceAddress;
use tokio::process::Command;

use super::engine::TerraformConfig;
use super::error::{Result, TerraformError};

// ============================================================================
// Pure Functions (Functional Core)
// ============================================================================

/// Arguments for `terraform init`.
pub fn init_args() -> Vec<String> {
    vec![
        "init".to_string(),
        "-input=false".to_string(),
        "-no-color".to_string(),
    ]
}

/// Arguments for `terraform state list`.
pub fn state_list_args() -> Vec<String> {
    vec!["state".to_string(), "list".to_string()]
}

/// Arguments for `terraform import <address> <id>`.
pub fn import_args(address: &ResourceAddress, external_id: &str) -> Vec<String> {
    vec![
        "import".to_string(),
        "-input=false".to_string(),
        "-no-color".to_string(),
        address.to_string(),
        external_id.to_string(),
    ]
}

/// Returns the addresses printed by `terraform state list`.
pub fn parse_state_list(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// True if `terraform import` refused because the address is already in state.
pub fn is_already_managed(stderr: &str) -> bool {
    stderr.contains("Resource already managed by Terraform")
}

/// True if `terraform state list` failed only because no state exists yet.
pub fn is_missing_state(stderr: &str) -> bool {
    stderr.contains("No state file was found")
}

/// Human-readable command line for logs and errors.
pub fn command_display(binary: &str, args: &[String]) -> String {
    std::iter::once(binary)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// I/O Functions (Imperative Shell)
// ============================================================================

/// Runs terraform inside the working area and captures its output.
///
/// A non-zero exit is not an error here; callers classify the output.
pub async fn run_terraform(
    config: &TerraformConfig,
    area: &WorkingArea,
    args: &[String],
) -> Result<Output> {
    let command_line = command_display(&config.binary, args);
    tracing::debug!(command = %command_line, cwd = %area.root().display(), "Running terraform");

    let mut cmd = Command::new(&config.binary);
    cmd.args(args)
        .current_dir(area.root())
        .env("TF_IN_AUTOMATION", "1")
        .env("TF_INPUT", "0")
        .stdin(Stdio::null());

    if let Some(cache_dir) = &config.plugin_cache_dir {
        cmd.env("TF_PLUGIN_CACHE_DIR", cache_dir);
    }

    let output = cmd.output().await.map_err(|source| TerraformError::Spawn {
        command: command_line.clone(),
        source,
    })?;

    tracing::debug!(
        command = %command_line,
        status = %output.status,
        stdout = %String::from_utf8_lossy(&output.stdout).trim(),
        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
        "Terraform finished"
    );

    Ok(output)
}

/// Turns a failed command's output into `CommandFailed`.
pub fn command_failed(binary: &str, args: &[String], output: &Output) -> TerraformError {
    TerraformError::CommandFailed {
        command: command_display(binary, args),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynarep_core::replication::LogicalId;

    #[test]
    fn test_init_args_disable_prompts() {
        assert_eq!(init_args(), vec!["init", "-input=false", "-no-color"]);
    }

    #[test]
    fn test_import_args() {
        let address = ResourceAddress::for_table(&LogicalId::from_table_name("Orders"));
        assert_eq!(
            import_args(&address, "Orders"),
            vec![
                "import",
                "-input=false",
                "-no-color",
                "aws_dynamodb_table.Orders",
                "Orders"
            ]
        );
    }

    #[test]
    fn test_import_uses_real_table_name_as_id() {
        let address = ResourceAddress::for_table(&LogicalId::from_table_name("prod.orders"));
        let args = import_args(&address, "prod.orders");
        assert_eq!(args[3], "aws_dynamodb_table.prod_orders");
        assert_eq!(args[4], "prod.orders");
    }

    #[test]
    fn test_parse_state_list() {
        let stdout = "aws_dynamodb_table.Orders\n\naws_dynamodb_table.Users\n";
        assert_eq!(
            parse_state_list(stdout),
            vec!["aws_dynamodb_table.Orders", "aws_dynamodb_table.Users"]
        );
        assert!(parse_state_list("").is_empty());
    }

    #[test]
    fn test_classify_already_managed() {
        let stderr = "Error: Resource already managed by Terraform\n\nTerraform is already managing a remote object for aws_dynamodb_table.Orders.";
        assert!(is_already_managed(stderr));
        assert!(!is_already_managed("Error: Cannot import non-existent remote object"));
    }

    #[test]
    fn test_classify_missing_state() {
        assert!(is_missing_state("No state file was found!\n"));
        assert!(!is_missing_state("Error: Failed to load state"));
    }

    #[tokio::test]
    async fn test_spawn_error_names_command_line() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = TerraformConfig {
            binary: "dynarep-test-no-such-terraform".to_string(),
            working_dir: temp.path().to_path_buf(),
            lock_file: None,
            plugin_cache_dir: None,
        };

        let result = run_terraform(&config, &WorkingArea::new(temp.path()), &state_list_args()).await;

        match result {
            Err(TerraformError::Spawn { command, .. }) => {
                assert_eq!(command, "dynarep-test-no-such-terraform state list");
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test]
    fn test_command_display() {
        assert_eq!(
            command_display("terraform", &init_args()),
            "terraform init -input=false -no-color"
        );
    }
}
