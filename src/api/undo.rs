//! Undo runner: two phases, order matters.
//!
//! Phase 1 reverts the copies (deletes them, or moves them back for a move
//! operation). Phase 2 recreates, in order, everything the transfer
//! overwrote. Only then is the bookkeeping reset to the construction-time
//! record so a subsequent redo reproduces the original transfer. A phase
//! failure surfaces as an error and rolls the operation forward to
//! "cannot undo further" — no internal retry.

use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::logging::{now_iso, AuditCtx, AuditSink, FactsEmitter, StageLogger};
use crate::op::{ids, Direction, TransferOperation};
use crate::progress::ProgressSink;
use crate::types::{Error, Result, UndoReport, WsPath};

use super::Copyback;

pub(super) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Copyback<E, A>,
    op: &mut TransferOperation,
    progress: &mut dyn ProgressSink,
) -> Result<UndoReport> {
    let t0 = Instant::now();
    if !op.is_valid() {
        return Err(Error::invalid_state("operation was marked invalid"));
    }
    let ctx = AuditCtx::new(api.facts(), ids::op_id(op).to_string(), now_iso());
    let slog = StageLogger::new(&ctx);
    api.audit()
        .log(Level::Info, &format!("undo: starting ({})", op.label()));

    let _guard = api.hold_lock()?;

    let copies: Vec<WsPath> = op.sources().to_vec();
    let originals: Vec<WsPath> = op.original_sources().to_vec();
    // A resumed undo works on a suffix of the original order; the offset
    // keeps each copy paired with its own original location.
    let offset = op.source_offset();
    slog.undo_attempt()
        .field("copies", json!(copies.len()))
        .field("overwritten", json!(op.overwritten().len()))
        .emit_success();
    progress.begin_task(copies.len() + op.overwritten().len());

    // Phase 1: revert the copies.
    let mut reverted = 0usize;
    let mut cancelled = false;
    for (idx, copy) in copies.iter().enumerate() {
        if progress.is_cancelled() {
            cancelled = true;
            break;
        }
        let res = match op.direction() {
            Direction::Copy => api.store().remove(copy),
            Direction::Move => match originals.get(offset + idx) {
                Some(back) => api
                    .store()
                    .copy(copy, back)
                    .and_then(|()| api.store().remove(copy)),
                None => Err(std::io::Error::other("no original location for copy")),
            },
        };
        if let Err(e) = res {
            op.rebind_sources_at(
                copies.get(reverted..).unwrap_or_default().to_vec(),
                offset + reverted,
            );
            op.mark_invalid();
            let err = Error::storage("revert", &copy.as_path(), &e);
            slog.undo_result()
                .path(copy.as_path().display().to_string())
                .field("error", json!(err.to_string()))
                .emit_failure();
            api.audit().log(Level::Warn, &format!("undo: failed: {err}"));
            return Err(err);
        }
        reverted += 1;
        progress.worked(1);
    }

    if cancelled {
        // Copies not yet reverted remain the current targets; snapshots are
        // untouched, so a later undo is still consistent.
        op.rebind_sources_at(
            copies.get(reverted..).unwrap_or_default().to_vec(),
            offset + reverted,
        );
        progress.done();
        let duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
        slog.undo_result()
            .field("reverted", json!(reverted))
            .field("cancelled", json!(true))
            .emit_warn();
        return Ok(UndoReport {
            reverted,
            recreated: 0,
            cancelled: true,
            duration_ms,
        });
    }

    // Phase 2: recreate what the transfer overwrote, in order.
    let mut recreated = 0usize;
    for snap in op.overwritten().to_vec() {
        if let Err(e) = api.store().recreate(&snap) {
            // Keep the snapshots that were not recreated; their data is all
            // that remains of the overwritten resources.
            op.drop_recreated(recreated);
            op.rebind_sources(Vec::new());
            op.mark_invalid();
            let err = Error::storage("recreate", &snap.rel, &e);
            slog.undo_result()
                .path(snap.rel.display().to_string())
                .field("error", json!(err.to_string()))
                .emit_failure();
            api.audit().log(Level::Warn, &format!("undo: failed: {err}"));
            return Err(err);
        }
        recreated += 1;
        progress.worked(1);
    }
    op.clear_overwritten();

    // Reset the live bookkeeping to the construction-time record so redo
    // reproduces the original transfer.
    op.reset_to_original();
    progress.done();

    let duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
    slog.undo_result()
        .field("reverted", json!(reverted))
        .field("recreated", json!(recreated))
        .field("duration_ms", json!(duration_ms))
        .emit_success();
    api.audit().log(Level::Info, "undo: finished");

    Ok(UndoReport {
        reverted,
        recreated,
        cancelled: false,
        duration_ms,
    })
}
