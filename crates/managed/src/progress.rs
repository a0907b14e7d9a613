//! Progress reporting for batches

use crate::error::Result;
use crate::types::ReconcileOutcome;

/// Progress callback for batch reconciliation
///
/// Called from worker threads, so implementations take `&self`.
pub trait ProgressCallback: Send + Sync {
    /// Called before the batch starts
    fn on_batch_start(&self, count: usize);

    /// Called when a record starts reconciling
    fn on_record_start(&self, name: &str);

    /// Called when a record finishes
    fn on_record_complete(&self, name: &str, result: &Result<ReconcileOutcome>);

    /// Called when the batch completes
    fn on_batch_complete(&self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&self, _count: usize) {}
    fn on_record_start(&self, _name: &str) {}
    fn on_record_complete(&self, _name: &str, _result: &Result<ReconcileOutcome>) {}
    fn on_batch_complete(&self) {}
}
