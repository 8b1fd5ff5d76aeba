//! Caller-supplied progress and cancellation sink.
//!
//! Verbs poll `is_cancelled` between resources, so a long multi-resource
//! transfer can be aborted at resource granularity without ever leaving a
//! single resource half-done.

pub trait ProgressSink {
    fn begin_task(&mut self, _total: usize) {}
    fn worked(&mut self, _n: usize) {}
    fn is_cancelled(&self) -> bool {
        false
    }
    fn done(&mut self) {}
}

/// Sink that reports nothing and never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}
