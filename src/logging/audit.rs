//! Fact emission helpers shared by the verb runners.
//!
//! Every fact carries a minimal envelope: `schema_version`, `ts`, `op_id`
//! and `path`. Previews (`describe`) use the zero timestamp so their output
//! is deterministic.

use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::logging::FactsEmitter;

pub(crate) const SCHEMA_VERSION: i64 = 1;

pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

#[must_use]
pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

pub struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub op_id: String,
    pub ts: String,
}

impl<'a> AuditCtx<'a> {
    #[must_use]
    pub fn new(facts: &'a dyn FactsEmitter, op_id: String, ts: String) -> Self {
        Self { facts, op_id, ts }
    }
}

/// Stage for typed fact emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    ExecuteAttempt,
    ExecuteResult,
    UndoAttempt,
    UndoResult,
    RedoResult,
    StatusCheck,
    Describe,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::ExecuteAttempt => "execute.attempt",
            Stage::ExecuteResult => "execute.result",
            Stage::UndoAttempt => "undo.attempt",
            Stage::UndoResult => "undo.result",
            Stage::RedoResult => "redo.result",
            Stage::StatusCheck => "status.check",
            Stage::Describe => "describe",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over fact emission with a centralized envelope.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    #[must_use]
    pub fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn execute_attempt(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ExecuteAttempt)
    }
    pub fn execute_result(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ExecuteResult)
    }
    pub fn undo_attempt(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::UndoAttempt)
    }
    pub fn undo_result(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::UndoResult)
    }
    pub fn redo_result(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RedoResult)
    }
    pub fn status_check(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::StatusCheck)
    }
    pub fn describe(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Describe)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.fields.insert("path".into(), json!(path.into()));
        self
    }

    #[must_use]
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn merge(mut self, extra: Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
            obj.entry("ts").or_insert(json!(self.ctx.ts));
            obj.entry("op_id").or_insert(json!(self.ctx.op_id));
            obj.entry("path").or_insert(json!(""));
            obj.entry("decision").or_insert(json!(decision.as_str()));
        }
        self.ctx
            .facts
            .emit("copyback", self.stage.as_event(), decision.as_str(), fields);
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
    pub fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Capture {
        events: Arc<Mutex<Vec<(String, String, Value)>>>,
    }

    impl FactsEmitter for Capture {
        fn emit(&self, _subsystem: &str, event: &str, decision: &str, fields: Value) {
            self.events
                .lock()
                .unwrap()
                .push((event.to_string(), decision.to_string(), fields));
        }
    }

    #[test]
    fn envelope_fields_are_present() {
        let cap = Capture::default();
        let ctx = AuditCtx::new(&cap, "op-1".to_string(), TS_ZERO.to_string());
        StageLogger::new(&ctx)
            .execute_result()
            .path("/ws/a")
            .field("resources", json!(2))
            .emit_success();
        let evs = cap.events.lock().unwrap();
        let (event, decision, fields) = &evs[0];
        assert_eq!(event, "execute.result");
        assert_eq!(decision, "success");
        assert_eq!(fields.get("schema_version").unwrap().as_i64(), Some(1));
        assert_eq!(fields.get("op_id").unwrap().as_str(), Some("op-1"));
        assert_eq!(fields.get("path").unwrap().as_str(), Some("/ws/a"));
        assert_eq!(fields.get("resources").unwrap().as_i64(), Some(2));
    }
}
