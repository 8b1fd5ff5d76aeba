use log::Level;
use serde_json::Value;

/// Structured fact stream: one JSON object per stage event.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Human-readable audit line stream.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Default sink that discards everything; callers wire their own.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}
