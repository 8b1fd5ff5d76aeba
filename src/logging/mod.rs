pub mod audit;
pub mod facts;

pub use audit::{now_iso, AuditCtx, Decision, EventBuilder, Stage, StageLogger, TS_ZERO};
pub use facts::{AuditSink, FactsEmitter, JsonlSink};
