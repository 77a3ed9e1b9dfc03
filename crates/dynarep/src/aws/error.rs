//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `InspectError` from `dynarep_core::provisioning`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use dynarep_core::provisioning::InspectError;

/// Map a DescribeTable SDK error to InspectError.
///
/// A missing table is `NotFound`. Everything else, including dispatch and
/// credential failures, is `Query` carrying the full error chain.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> InspectError {
    let diagnostic = DisplayErrorContext(&err).to_string();

    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => InspectError::NotFound {
            table_name: table_name.to_string(),
        },
        DescribeTableError::InternalServerError(_) => InspectError::Query {
            table_name: table_name.to_string(),
            message: format!("DynamoDB internal server error: {}", diagnostic),
        },
        _ => InspectError::Query {
            table_name: table_name.to_string(),
            message: diagnostic,
        },
    }
}
