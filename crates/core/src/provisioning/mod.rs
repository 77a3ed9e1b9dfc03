mod error;
mod outcome;
mod pipeline;
mod reconcile;
#[cfg(test)]
mod testing;
mod traits;

pub use error::{EngineError, InspectError, ReconcileError, Result};
pub use outcome::{format_report, Outcome, RunReport, SkipReason, TableOutcome};
pub use pipeline::{build_plan, inspect_tables, plan_replication, Inspection};
pub use reconcile::reconcile;
pub use traits::{ImportStatus, ProvisioningEngine, TableInspector, WorkingArea};
