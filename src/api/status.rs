//! Status computation. Queries never fail; they return a structured
//! [`OpStatus`] recomputed from live workspace state on every call.

use serde_json::json;

use crate::logging::{now_iso, AuditCtx, AuditSink, FactsEmitter, StageLogger};
use crate::op::{ids, TransferOperation};
use crate::types::{code_str, OpStatus, StatusCode, WsPath};
use crate::workspace::Workspace;

use super::Copyback;

/// Shared check behind `execution_status` and `redoable_status`: the
/// transfer must not be partially applied, every current source must exist,
/// and every destination path must have an existing, writable parent.
pub(super) fn transfer_status(ws: &dyn Workspace, op: &TransferOperation) -> OpStatus {
    if !op.is_valid() {
        return OpStatus::blocked(StatusCode::E_INVALID_STATE, "operation was marked invalid");
    }
    // A cancelled or failed run leaves only part of the transfer applied
    // (or undone). Re-running on that state would pair the remaining
    // sources with the wrong destinations, so only undo may proceed.
    if op.sources().len() != op.original_sources().len() {
        return OpStatus::blocked(
            StatusCode::E_PARTIAL_TRANSFER,
            "transfer is partially applied; undo before running again",
        );
    }
    for (idx, src) in op.sources().iter().enumerate() {
        if !ws.exists(src) {
            return OpStatus::blocked(
                StatusCode::E_MISSING_SOURCE,
                format!("source no longer exists: {}", src.rel().display()),
            );
        }
        let dest = match op.destination().path_for(src, idx) {
            Ok(d) => d,
            Err(e) => return OpStatus::blocked(StatusCode::E_DEST_PARENT, e.msg),
        };
        if !ws.parent_exists(&dest) {
            return OpStatus::blocked(
                StatusCode::E_DEST_PARENT,
                format!("destination parent missing: {}", dest.rel().display()),
            );
        }
        if !ws.is_writable(&dest) {
            return OpStatus::blocked(
                StatusCode::E_DEST_NOT_WRITABLE,
                format!("destination not writable: {}", dest.rel().display()),
            );
        }
    }
    OpStatus::Ok
}

/// Undoable iff the copies still exist and are deletable, and every
/// overwritten snapshot can be recreated (its target path is free or is one
/// of this operation's own copies).
///
/// A missing copy permanently invalidates the operation: the copies may be
/// all that is left of the data, and deleting survivors on a later undo
/// would make that worse. Writability problems are reported but are not
/// absorbing; they may be transient.
pub(super) fn undoable_status<E: FactsEmitter, A: AuditSink>(
    api: &Copyback<E, A>,
    op: &mut TransferOperation,
) -> OpStatus {
    let ws = api.store();
    if !op.is_valid() {
        return OpStatus::blocked(StatusCode::E_INVALID_STATE, "operation was marked invalid");
    }
    let missing: Option<WsPath> = op.sources().iter().find(|c| !ws.exists(c)).cloned();
    if let Some(copy) = missing {
        op.mark_invalid();
        let status = OpStatus::blocked(
            StatusCode::E_INVALID_STATE,
            format!("copy no longer exists: {}", copy.rel().display()),
        );
        emit_invalidated(api, op, &copy);
        return status;
    }
    for copy in op.sources() {
        if !ws.is_writable(copy) {
            return OpStatus::blocked(
                StatusCode::E_DEST_NOT_WRITABLE,
                format!("copy cannot be deleted: {}", copy.rel().display()),
            );
        }
    }
    if let Some(anchor) = op.original_sources().first() {
        for snap in op.overwritten() {
            let owned = op.sources().iter().any(|s| s.rel() == snap.rel);
            if owned {
                continue;
            }
            if let Ok(target) = WsPath::from_rooted(anchor.root(), &snap.rel) {
                if ws.exists(&target) {
                    return OpStatus::blocked(
                        StatusCode::E_SNAPSHOT_CONFLICT,
                        format!("snapshot target occupied: {}", snap.rel.display()),
                    );
                }
            }
        }
    }
    OpStatus::Ok
}

fn emit_invalidated<E: FactsEmitter, A: AuditSink>(
    api: &Copyback<E, A>,
    op: &TransferOperation,
    copy: &WsPath,
) {
    let ctx = AuditCtx::new(api.facts(), ids::op_id(op).to_string(), now_iso());
    StageLogger::new(&ctx)
        .status_check()
        .path(copy.as_path().display().to_string())
        .field("error_id", json!(code_str(StatusCode::E_INVALID_STATE)))
        .emit_failure();
}
