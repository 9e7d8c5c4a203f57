//! Lightweight progress reporting for long-running batch operations.
//! Frontends (CLI, embedding applications) implement this to surface status
//! to users; the engine itself never prints.

pub trait Progress {
    /// Called once at the start with the number of accounts to process.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called after each account completes (1-based index).
    fn account_done(&mut self, _current: usize, _total: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;

impl Progress for NullProgress {}
