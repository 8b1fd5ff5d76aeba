//! Cancellation between resources leaves a consistent, undoable prefix.

use std::fs;
use std::path::Path;

use copyback::logging::JsonlSink;
use copyback::progress::{NoProgress, ProgressSink};
use copyback::types::{StatusCode, WsPath};
use copyback::workspace::FsWorkspace;
use copyback::{Copyback, TransferOperation};

/// Cancels once `after` resources have completed.
struct CancelAfter {
    after: usize,
    seen: usize,
}

impl CancelAfter {
    fn new(after: usize) -> Self {
        Self { after, seen: 0 }
    }
}

impl ProgressSink for CancelAfter {
    fn worked(&mut self, n: usize) {
        self.seen += n;
    }

    fn is_cancelled(&self) -> bool {
        self.seen >= self.after
    }
}

fn engine(root: &Path) -> Copyback<JsonlSink, JsonlSink> {
    Copyback::new(
        JsonlSink,
        JsonlSink,
        Box::new(FsWorkspace::new(root.to_path_buf())),
    )
}

fn p(root: &Path, rel: &str) -> WsPath {
    WsPath::from_rooted(root, Path::new(rel)).unwrap()
}

#[test]
fn execute_cancelled_mid_batch_records_the_completed_prefix() {
    let td = tempfile::tempdir().unwrap();
    let root = td.path();
    fs::write(root.join("x"), b"x").unwrap();
    fs::write(root.join("y"), b"y").unwrap();
    fs::create_dir(root.join("out")).unwrap();

    let api = engine(root);
    let mut op = TransferOperation::copy_to(
        api.workspace(),
        vec![p(root, "x"), p(root, "y")],
        p(root, "out"),
        "copy both",
    )
    .unwrap();

    let report = api.execute(&mut op, &mut CancelAfter::new(1)).unwrap();
    assert!(report.cancelled, "cancellation is not an error");
    assert_eq!(report.executed.len(), 1);
    assert!(root.join("out/x").exists());
    assert!(!root.join("out/y").exists(), "never started, never half-done");
    assert_eq!(op.sources().len(), 1, "bookkeeping matches what happened");

    // The prefix stays fully undoable.
    assert!(api.undoable_status(&mut op).is_ok());
    let undo = api.undo(&mut op, &mut NoProgress).unwrap();
    assert_eq!(undo.reverted, 1);
    assert!(!root.join("out/x").exists());
    assert_eq!(op.sources().len(), 2, "reset to the construction-time record");
}

#[test]
fn undo_cancelled_mid_batch_keeps_the_rest_undoable() {
    let td = tempfile::tempdir().unwrap();
    let root = td.path();
    fs::write(root.join("x"), b"x").unwrap();
    fs::write(root.join("y"), b"y").unwrap();
    fs::create_dir(root.join("out")).unwrap();

    let api = engine(root);
    let mut op = TransferOperation::copy_to(
        api.workspace(),
        vec![p(root, "x"), p(root, "y")],
        p(root, "out"),
        "copy both",
    )
    .unwrap();
    api.execute(&mut op, &mut NoProgress).unwrap();

    let report = api.undo(&mut op, &mut CancelAfter::new(1)).unwrap();
    assert!(report.cancelled);
    assert_eq!(report.reverted, 1);
    assert!(!root.join("out/x").exists());
    assert!(root.join("out/y").exists());
    assert_eq!(op.sources().len(), 1, "remaining copy is still tracked");

    // A second undo finishes the job.
    let report = api.undo(&mut op, &mut NoProgress).unwrap();
    assert!(!report.cancelled);
    assert_eq!(report.reverted, 1);
    assert!(!root.join("out/y").exists());
    assert_eq!(fs::read(root.join("x")).unwrap(), b"x");
    assert_eq!(fs::read(root.join("y")).unwrap(), b"y");
}

#[test]
fn redo_is_blocked_until_a_cancelled_undo_completes() {
    let td = tempfile::tempdir().unwrap();
    let root = td.path();
    fs::write(root.join("x"), b"XX").unwrap();
    fs::write(root.join("y"), b"YY").unwrap();

    let api = engine(root);
    let mut op = TransferOperation::copy_each(
        api.workspace(),
        vec![p(root, "x"), p(root, "y")],
        vec![p(root, "dx"), p(root, "dy")],
        "copy both",
    )
    .unwrap();
    api.execute(&mut op, &mut NoProgress).unwrap();

    // Cancel after dx is reverted. The surviving copy dy must not be
    // re-paired with dx's destination slot.
    let report = api.undo(&mut op, &mut CancelAfter::new(1)).unwrap();
    assert!(report.cancelled);
    assert!(!root.join("dx").exists());

    assert_eq!(
        api.redoable_status(&op).code(),
        Some(StatusCode::E_PARTIAL_TRANSFER)
    );
    api.redo(&mut op, &mut NoProgress).unwrap_err();
    assert!(!root.join("dx").exists(), "nothing was written to dx");

    let report = api.undo(&mut op, &mut NoProgress).unwrap();
    assert_eq!(report.reverted, 1);
    assert!(!root.join("dy").exists());

    let report = api.redo(&mut op, &mut NoProgress).unwrap();
    assert_eq!(report.executed.len(), 2);
    assert_eq!(fs::read(root.join("dx")).unwrap(), b"XX");
    assert_eq!(fs::read(root.join("dy")).unwrap(), b"YY");
}

#[test]
fn cancelled_move_undo_resumes_against_the_right_originals() {
    let td = tempfile::tempdir().unwrap();
    let root = td.path();
    fs::write(root.join("x"), b"XX").unwrap();
    fs::write(root.join("y"), b"YY").unwrap();
    fs::create_dir(root.join("out")).unwrap();

    let api = engine(root);
    let mut op = TransferOperation::move_to(
        api.workspace(),
        vec![p(root, "x"), p(root, "y")],
        p(root, "out"),
        "move both",
    )
    .unwrap();
    api.execute(&mut op, &mut NoProgress).unwrap();
    assert!(!root.join("x").exists());
    assert!(!root.join("y").exists());

    let report = api.undo(&mut op, &mut CancelAfter::new(1)).unwrap();
    assert!(report.cancelled);
    assert_eq!(fs::read(root.join("x")).unwrap(), b"XX");

    // The remaining copy goes back to y's location, not x's.
    let report = api.undo(&mut op, &mut NoProgress).unwrap();
    assert_eq!(report.reverted, 1);
    assert_eq!(fs::read(root.join("x")).unwrap(), b"XX");
    assert_eq!(fs::read(root.join("y")).unwrap(), b"YY");
    assert!(!root.join("out/y").exists());
}

#[test]
fn cancel_before_any_work_is_a_clean_no_op() {
    let td = tempfile::tempdir().unwrap();
    let root = td.path();
    fs::write(root.join("x"), b"x").unwrap();
    fs::create_dir(root.join("out")).unwrap();

    let api = engine(root);
    let mut op =
        TransferOperation::copy_to(api.workspace(), vec![p(root, "x")], p(root, "out"), "copy")
            .unwrap();

    let report = api.execute(&mut op, &mut CancelAfter::new(0)).unwrap();
    assert!(report.cancelled);
    assert!(report.executed.is_empty());
    assert!(!root.join("out/x").exists());
    assert!(op.sources().is_empty());
}
