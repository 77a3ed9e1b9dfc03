//! Core of dynarep: replication planning and adoption of existing DynamoDB
//! tables into Terraform-managed state.
//!
//! - [`replication`] holds the pure data model, the plan builder and the
//!   Terraform JSON renderer.
//! - [`provisioning`] holds the collaborator traits and the sequential
//!   inspect, plan and reconcile pipeline built on them.

pub mod provisioning;
pub mod replication;
