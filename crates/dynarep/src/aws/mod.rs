//! DynamoDB access: client construction, table inspection and SDK conversions.

mod client;
mod conversions;
mod error;

pub use client::{create_client, AwsConfig, DynamoInspector};
