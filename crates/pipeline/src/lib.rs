//! Background pose pipelines and the orchestrator that launches them.
//!
//! Callers go through [`orchestrator::PoseOrchestrator`]: it validates the
//! request synchronously, records a task in the ledger, and hands the rest of
//! the work to the bounded [`runner::TaskRunner`]. Everything that happens
//! after the task id is returned is reported only through the ledger.

pub mod config;
pub mod extraction;
pub mod image;
pub mod memory;
pub mod orchestrator;
pub mod runner;
pub mod style;

use dramagen_core::error::CoreError;
use dramagen_core::stores::TaskLedger;
use dramagen_core::types::TaskId;

pub use config::PipelineConfig;
pub use orchestrator::{Collaborators, PoseOrchestrator};
pub use runner::TaskRunner;

/// Text stored in the ledger for a failed task.
///
/// Variants that already carry a user-facing sentence store it verbatim;
/// the rest use their display form.
pub fn failure_message(err: &CoreError) -> String {
    match err {
        CoreError::Upstream(msg)
        | CoreError::Timeout(msg)
        | CoreError::InvalidState(msg) => msg.clone(),
        CoreError::Parse { message, .. } => format!("failed to parse AI response: {message}"),
        other => other.to_string(),
    }
}

/// Mark `task_id` failed, logging when the ledger itself is unreachable.
pub(crate) async fn record_failure(ledger: &dyn TaskLedger, task_id: TaskId, err: &CoreError) {
    let message = failure_message(err);
    match ledger.fail(task_id, &message).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(%task_id, "Task already terminal, failure not recorded");
        }
        Err(e) => {
            tracing::error!(%task_id, error = %e, task_error = %message, "Failed to record task failure");
        }
    }
}
