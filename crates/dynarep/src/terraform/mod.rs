//! Terraform as the provisioning engine: staging, init, state inspection and import.

mod commands;
mod engine;
mod error;
mod staging;

pub use engine::{TerraformConfig, TerraformEngine};
pub use staging::is_safe_working_dir;
