//! Run configuration, built once at the process boundary.
//!
//! Values come from CLI flags (with environment fallbacks) and, for the three
//! core inputs, from interactive prompts when a flag is missing. Nothing below
//! this module reads the environment or the current directory.

use std::path::{Component, Path, PathBuf};

use dialoguer::Input;
use dynarep_core::replication::{
    Region, RegionError, RenderOptions, ReplicaRequest, RequestError,
    DEFAULT_AWS_PROVIDER_VERSION,
};
use thiserror::Error;

use crate::aws::AwsConfig;
use crate::terraform::{is_safe_working_dir, TerraformConfig};

/// Errors that can occur while building the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("Invalid home region: {0}")]
    HomeRegion(#[from] RegionError),

    #[error("Region {0} is where the tables live; it cannot also be a replica target")]
    HomeRegionIsTarget(Region),

    #[error("Refusing to use '{0}' as the working directory; it is wiped on every run")]
    UnsafeWorkingDir(PathBuf),

    #[error("State file {state} is inside working directory {working_dir}, which is wiped on every run")]
    StateInsideWorkingDir { state: PathBuf, working_dir: PathBuf },

    #[error("Failed to read input: {0}")]
    Prompt(String),
}

/// Flags for a replication run.
#[derive(Debug, Clone, clap::Args)]
pub struct ReplicateArgs {
    /// Comma-separated regions the tables will be replicated to (e.g. "us-east-1, us-east-2").
    #[arg(long, env = "DYNAREP_REGIONS")]
    pub regions: Option<String>,

    /// Comma-separated tables to replicate (e.g. "Orders, Users").
    #[arg(long, env = "DYNAREP_TABLES")]
    pub tables: Option<String>,

    /// Region the tables currently live in.
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom DynamoDB endpoint (e.g. http://localhost:8000 for DynamoDB Local).
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Working directory terraform runs in. Replaced on every run.
    #[arg(long, env = "DYNAREP_WORK_DIR", default_value = ".dynarep/build")]
    pub work_dir: PathBuf,

    /// Terraform state file. Kept across runs; must be outside the working directory.
    #[arg(long, env = "DYNAREP_STATE_PATH", default_value = ".dynarep/terraform.tfstate")]
    pub state_path: PathBuf,

    /// Terraform executable.
    #[arg(long, env = "TERRAFORM_BIN", default_value = "terraform")]
    pub terraform_bin: String,

    /// Provider lock file (.terraform.lock.hcl) copied into the working directory.
    #[arg(long, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,

    /// Shared terraform plugin cache.
    #[arg(long, env = "TF_PLUGIN_CACHE_DIR", value_name = "PATH")]
    pub plugin_cache_dir: Option<PathBuf>,

    /// Version constraint for the hashicorp/aws provider.
    #[arg(long, default_value = DEFAULT_AWS_PROVIDER_VERSION)]
    pub aws_provider_version: String,

    /// Print the plan and the rendered configuration without running terraform.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Exit with an error if any table did not end up managed.
    #[arg(long)]
    pub strict: bool,
}

/// The three values every run needs, after flags and prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub regions: String,
    pub tables: String,
    pub home_region: String,
}

impl Inputs {
    /// Takes each value from its flag, prompting for any that are missing.
    pub fn collect(args: &ReplicateArgs) -> Result<Self, ConfigError> {
        Ok(Self {
            regions: flag_or_prompt(
                &args.regions,
                "Enter a comma separated list of regions where tables will be replicated to (us-east-1, us-east-2)",
            )?,
            tables: flag_or_prompt(
                &args.tables,
                "Enter a comma separated list of tables to make replica of (Table1, Table2)",
            )?,
            home_region: flag_or_prompt(&args.region, "Enter the region name where tables reside")?,
        })
    }
}

fn flag_or_prompt(value: &Option<String>, prompt: &str) -> Result<String, ConfigError> {
    match value {
        Some(value) => Ok(value.clone()),
        None => Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| ConfigError::Prompt(e.to_string())),
    }
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub request: ReplicaRequest,
    pub aws: AwsConfig,
    pub terraform: TerraformConfig,
    pub render: RenderOptions,
    pub dry_run: bool,
    pub force: bool,
    pub strict: bool,
}

impl RunConfig {
    /// Validates inputs and resolves every path against `cwd`.
    pub fn build(inputs: &Inputs, args: &ReplicateArgs, cwd: &Path) -> Result<Self, ConfigError> {
        let request = ReplicaRequest::parse(&inputs.regions, &inputs.tables)?;
        let home_region = Region::parse(&inputs.home_region)?;

        if request.target_regions.contains(&home_region) {
            return Err(ConfigError::HomeRegionIsTarget(home_region));
        }

        if !is_safe_working_dir(&args.work_dir) {
            return Err(ConfigError::UnsafeWorkingDir(args.work_dir.clone()));
        }
        let working_dir = resolve(cwd, &args.work_dir);
        if cwd.starts_with(&working_dir) {
            return Err(ConfigError::UnsafeWorkingDir(working_dir));
        }

        let state_path = resolve(cwd, &args.state_path);
        if state_path.starts_with(&working_dir) {
            return Err(ConfigError::StateInsideWorkingDir {
                state: state_path,
                working_dir,
            });
        }

        let mut render = RenderOptions::new(home_region.clone(), state_path)
            .with_aws_provider_version(&args.aws_provider_version);
        if let Some(endpoint) = &args.endpoint_url {
            render = render.with_dynamodb_endpoint(endpoint);
        }

        Ok(Self {
            request,
            aws: AwsConfig {
                endpoint_url: args.endpoint_url.clone(),
                region: home_region.to_string(),
            },
            terraform: TerraformConfig {
                binary: args.terraform_bin.clone(),
                working_dir,
                lock_file: args.lock_file.as_ref().map(|p| resolve(cwd, p)),
                plugin_cache_dir: args.plugin_cache_dir.as_ref().map(|p| resolve(cwd, p)),
            },
            render,
            dry_run: args.dry_run,
            force: args.force,
            strict: args.strict,
        })
    }
}

/// Joins `path` onto `cwd` and removes `.` and `..` lexically.
fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in cwd.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}
