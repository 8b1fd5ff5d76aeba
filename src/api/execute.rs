//! Execute/redo runner.
//!
//! Ordering is load-bearing: a destination that would be overwritten is
//! snapshotted strictly before it is removed, so a failure at any later
//! point leaves the prior content recoverable. Cancellation is polled
//! between resources; the completed prefix stays recorded so a subsequent
//! undo matches whatever subset of the transfer actually happened.

use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::logging::{now_iso, AuditCtx, AuditSink, FactsEmitter, StageLogger};
use crate::op::{ids, Direction, TransferOperation};
use crate::progress::ProgressSink;
use crate::types::{code_str, Error, ExecReport, OpStatus, Result, WsPath};

use super::{status, Copyback};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Verb {
    Execute,
    Redo,
}

pub(super) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Copyback<E, A>,
    op: &mut TransferOperation,
    progress: &mut dyn ProgressSink,
    verb: Verb,
) -> Result<ExecReport> {
    let t0 = Instant::now();
    if !op.is_valid() {
        return Err(Error::invalid_state("operation was marked invalid"));
    }
    let ctx = AuditCtx::new(api.facts(), ids::op_id(op).to_string(), now_iso());
    let slog = StageLogger::new(&ctx);
    let verb_name = match verb {
        Verb::Execute => "execute",
        Verb::Redo => "redo",
    };
    api.audit()
        .log(Level::Info, &format!("{verb_name}: starting ({})", op.label()));

    let _guard = api.hold_lock()?;

    slog.execute_attempt()
        .field("verb", json!(verb_name))
        .field("resources", json!(op.sources().len()))
        .emit_success();

    // Gate on the lazily recomputed transfer status.
    if let OpStatus::Blocked { code, reason } = status::transfer_status(api.store(), op) {
        result_builder(&slog, verb)
            .field("error_id", json!(code_str(code)))
            .emit_failure();
        return Err(Error {
            kind: crate::types::ErrorKind::Storage,
            msg: format!("{}: {reason}", code_str(code)),
        });
    }

    let srcs: Vec<WsPath> = op.sources().to_vec();
    progress.begin_task(srcs.len());

    let mut copies: Vec<WsPath> = Vec::with_capacity(srcs.len());
    let mut overwrites = 0usize;
    let mut cancelled = false;
    let mut failure: Option<Error> = None;

    for (idx, src) in srcs.iter().enumerate() {
        if progress.is_cancelled() {
            cancelled = true;
            break;
        }
        let dest = match op.destination().path_for(src, idx) {
            Ok(d) => d,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        if api.store().exists(&dest) {
            // Snapshot happens-before overwrite.
            match api.store().snapshot(&dest) {
                Ok(snap) => op.push_overwritten(snap),
                Err(e) => {
                    failure = Some(Error::storage("snapshot", &dest.as_path(), &e));
                    break;
                }
            }
            if let Err(e) = api.store().remove(&dest) {
                failure = Some(Error::storage("overwrite", &dest.as_path(), &e));
                break;
            }
            overwrites += 1;
        }
        if let Err(e) = api.store().copy(src, &dest) {
            failure = Some(Error::storage("copy", &dest.as_path(), &e));
            break;
        }
        if op.direction() == Direction::Move {
            if let Err(e) = api.store().remove(src) {
                failure = Some(Error::storage("detach", &src.as_path(), &e));
                break;
            }
        }
        copies.push(dest);
        progress.worked(1);
    }

    // The copies become the operation's current targets, even after a
    // failure or cancellation, so undo cleans up exactly what happened.
    op.rebind_sources(copies.clone());
    progress.done();

    if let Some(e) = failure {
        result_builder(&slog, verb)
            .field("executed", json!(copies.len()))
            .field("error", json!(e.to_string()))
            .emit_failure();
        api.audit()
            .log(Level::Warn, &format!("{verb_name}: failed: {e}"));
        return Err(e);
    }

    let duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
    let builder = result_builder(&slog, verb)
        .field("executed", json!(copies.len()))
        .field("overwrites", json!(overwrites))
        .field("duration_ms", json!(duration_ms));
    if cancelled {
        builder.field("cancelled", json!(true)).emit_warn();
    } else {
        builder.emit_success();
    }
    api.audit()
        .log(Level::Info, &format!("{verb_name}: finished"));

    Ok(ExecReport {
        executed: copies,
        overwrites,
        cancelled,
        duration_ms,
    })
}

fn result_builder<'a>(
    slog: &'a StageLogger<'a>,
    verb: Verb,
) -> crate::logging::EventBuilder<'a> {
    match verb {
        Verb::Execute => slog.execute_result(),
        Verb::Redo => slog.redo_result(),
    }
}
