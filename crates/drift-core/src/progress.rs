/// Thread-safe progress, logging and cancellation hooks for batch alignment.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// Free-form status message.
    fn log(&self, _message: &str) {}

    /// `done` of `total` slices have completed.
    fn advance(&self, _done: usize, _total: usize) {}

    /// Checked between slices; returning `true` stops the batch.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
