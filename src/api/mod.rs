//! Engine facade: wires the workspace store, locking, and observability
//! around the operation verbs.

use serde_json::json;

use crate::adapters::{LockGuard, LockManager};
use crate::changes::{ChangeDirection, ChangeRecorder};
use crate::constants::DEFAULT_LOCK_TIMEOUT_MS;
use crate::logging::{AuditCtx, AuditSink, FactsEmitter, StageLogger, TS_ZERO};
use crate::op::{ids, TransferOperation};
use crate::progress::ProgressSink;
use crate::types::{ExecReport, OpStatus, Result, UndoReport};
use crate::workspace::Workspace;

mod execute;
mod status;
mod undo;

/// Drives [`TransferOperation`]s against a workspace store.
///
/// The undo-history controller owns the operations; this type owns the
/// ambient stack: facts and audit sinks, the store, and the optional
/// workspace lock. Each verb call is a scoped critical section over the
/// involved subtree; the lock guard is released on every exit path.
pub struct Copyback<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    store: Box<dyn Workspace>,
    lock: Option<Box<dyn LockManager>>, // None in dev/test; recommended in production
    lock_timeout_ms: u64,
}

impl<E: FactsEmitter, A: AuditSink> Copyback<E, A> {
    pub fn new(facts: E, audit: A, store: Box<dyn Workspace>) -> Self {
        Self {
            facts,
            audit,
            store,
            lock: None,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    #[must_use]
    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn workspace(&self) -> &dyn Workspace {
        self.store.as_ref()
    }

    /// Perform the transfer. See [`crate::op::TransferOperation`] for the
    /// bookkeeping contract.
    pub fn execute(
        &self,
        op: &mut TransferOperation,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExecReport> {
        execute::run(self, op, progress, execute::Verb::Execute)
    }

    /// Re-apply the transfer after an undo. Identical semantics to
    /// `execute`, operating on the reset bookkeeping.
    pub fn redo(
        &self,
        op: &mut TransferOperation,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExecReport> {
        execute::run(self, op, progress, execute::Verb::Redo)
    }

    /// Delete the copies, recreate anything the transfer overwrote, and
    /// reset the operation to its construction-time record.
    pub fn undo(
        &self,
        op: &mut TransferOperation,
        progress: &mut dyn ProgressSink,
    ) -> Result<UndoReport> {
        undo::run(self, op, progress)
    }

    /// Whether the transfer could run right now. Never cached.
    pub fn execution_status(&self, op: &TransferOperation) -> OpStatus {
        status::transfer_status(self.store.as_ref(), op)
    }

    /// Whether the transfer could be re-applied right now. Shares the
    /// execution check by definition.
    pub fn redoable_status(&self, op: &TransferOperation) -> OpStatus {
        status::transfer_status(self.store.as_ref(), op)
    }

    /// Whether the transfer could be undone right now. A copy that no
    /// longer exists permanently invalidates the operation.
    pub fn undoable_status(&self, op: &mut TransferOperation) -> OpStatus {
        status::undoable_status(self, op)
    }

    /// Preview the operation's effect without touching the store. Emits a
    /// deterministic `describe` fact; returns whether anything was declared.
    pub fn describe_changes(
        &self,
        op: &TransferOperation,
        direction: ChangeDirection,
        recorder: &mut dyn ChangeRecorder,
    ) -> bool {
        let declared = op.describe_changes(direction, recorder);
        let ctx = AuditCtx::new(
            &self.facts,
            ids::op_id(op).to_string(),
            TS_ZERO.to_string(),
        );
        StageLogger::new(&ctx)
            .describe()
            .field("declared", json!(declared))
            .emit_success();
        declared
    }

    pub(crate) fn facts(&self) -> &dyn FactsEmitter {
        &self.facts
    }

    pub(crate) fn audit(&self) -> &A {
        &self.audit
    }

    pub(crate) fn store(&self) -> &dyn Workspace {
        self.store.as_ref()
    }

    /// Acquire the workspace lock token for the duration of a verb call.
    pub(crate) fn hold_lock(&self) -> Result<Option<Box<dyn LockGuard>>> {
        match &self.lock {
            Some(mgr) => Ok(Some(mgr.acquire_workspace_lock(self.lock_timeout_ms)?)),
            None => Ok(None),
        }
    }
}
