//! The undoable unit: one copy (or move) of N resources to a destination.

pub mod ids;

use crate::changes::{ChangeDirection, ChangeRecorder};
use crate::types::{Destination, Error, Result, WsPath};
use crate::workspace::{ResourceSnapshot, Workspace};

/// Which way the transfer carries resources. Folds what would otherwise be
/// two sibling operation types into one concrete type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Copy,
    Move,
}

/// A reversible, re-playable transfer of resources.
///
/// `sources` are the operation's *current* targets: the input resources
/// before execute, the produced copies after execute, and the inputs again
/// after undo. The `original_*` fields are an immutable record of the
/// operation's first-ever intended effect, captured at construction, and are
/// what undo resets the live bookkeeping to.
///
/// `sources` is always a contiguous run of the original order;
/// `pending_offset` is the run's start index. It is non-zero only after a
/// partially completed undo, and keeps per-resource destinations and the
/// move-back targets paired with the right source when the undo resumes.
#[derive(Debug)]
pub struct TransferOperation {
    direction: Direction,
    label: String,
    sources: Vec<WsPath>,
    pending_offset: usize,
    destination: Destination,
    overwritten: Vec<ResourceSnapshot>,
    original_sources: Vec<WsPath>,
    original_snapshots: Vec<ResourceSnapshot>,
    original_destination: Destination,
    valid: bool,
}

impl TransferOperation {
    /// Build an operation over `sources` and `destination`.
    ///
    /// Deep-snapshots every input resource so the operation can later prove
    /// the originals are intact before allowing an undo. A source that
    /// cannot be snapshotted (e.g. it does not exist) fails construction.
    pub fn new(
        ws: &dyn Workspace,
        direction: Direction,
        sources: Vec<WsPath>,
        destination: Destination,
        label: impl Into<String>,
    ) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::input("no resources to transfer"));
        }
        if !destination.covers(sources.len()) {
            return Err(Error::input(
                "destination path count does not match resource count",
            ));
        }
        let mut original_snapshots = Vec::with_capacity(sources.len());
        for src in &sources {
            let snap = ws
                .snapshot(src)
                .map_err(|e| Error::storage("snapshot", &src.as_path(), &e))?;
            original_snapshots.push(snap);
        }
        Ok(Self {
            direction,
            label: label.into(),
            original_sources: sources.clone(),
            original_destination: destination.clone(),
            sources,
            pending_offset: 0,
            destination,
            overwritten: Vec::new(),
            original_snapshots,
            valid: true,
        })
    }

    /// Copy a single resource to a full destination path (name included).
    pub fn copy_one(
        ws: &dyn Workspace,
        resource: WsPath,
        dest_path: WsPath,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            ws,
            Direction::Copy,
            vec![resource],
            Destination::PerResource(vec![dest_path]),
            label,
        )
    }

    /// Copy resources into one shared container, preserving their names.
    pub fn copy_to(
        ws: &dyn Workspace,
        resources: Vec<WsPath>,
        dest_dir: WsPath,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::new(ws, Direction::Copy, resources, Destination::Shared(dest_dir), label)
    }

    /// Copy each resource to its own full destination path.
    pub fn copy_each(
        ws: &dyn Workspace,
        resources: Vec<WsPath>,
        dest_paths: Vec<WsPath>,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            ws,
            Direction::Copy,
            resources,
            Destination::PerResource(dest_paths),
            label,
        )
    }

    /// Move a single resource to a full destination path.
    pub fn move_one(
        ws: &dyn Workspace,
        resource: WsPath,
        dest_path: WsPath,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            ws,
            Direction::Move,
            vec![resource],
            Destination::PerResource(vec![dest_path]),
            label,
        )
    }

    /// Move resources into one shared container.
    pub fn move_to(
        ws: &dyn Workspace,
        resources: Vec<WsPath>,
        dest_dir: WsPath,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::new(ws, Direction::Move, resources, Destination::Shared(dest_dir), label)
    }

    /// Move each resource to its own full destination path.
    pub fn move_each(
        ws: &dyn Workspace,
        resources: Vec<WsPath>,
        dest_paths: Vec<WsPath>,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            ws,
            Direction::Move,
            resources,
            Destination::PerResource(dest_paths),
            label,
        )
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn sources(&self) -> &[WsPath] {
        &self.sources
    }

    #[must_use]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    #[must_use]
    pub fn overwritten(&self) -> &[ResourceSnapshot] {
        &self.overwritten
    }

    #[must_use]
    pub fn original_sources(&self) -> &[WsPath] {
        &self.original_sources
    }

    #[must_use]
    pub fn original_snapshots(&self) -> &[ResourceSnapshot] {
        &self.original_snapshots
    }

    /// Whether the operation can still run. `false` is absorbing.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// One-way transition: once invalid, the operation only answers status
    /// queries (with the invalidity reason).
    pub fn mark_invalid(&mut self) {
        self.valid = false;
    }

    /// Declare this operation's planned effect without performing it.
    ///
    /// Returns whether any change was declared, so callers can skip no-op
    /// previews.
    pub fn describe_changes(
        &self,
        direction: ChangeDirection,
        recorder: &mut dyn ChangeRecorder,
    ) -> bool {
        let mut declared = false;
        match direction {
            ChangeDirection::Undo => {
                for copy in &self.sources {
                    recorder.declare_delete(copy);
                    declared = true;
                }
                for snap in &self.overwritten {
                    recorder.declare_create(snap);
                    declared = true;
                }
            }
            ChangeDirection::Execute => {
                for (idx, src) in self.sources.iter().enumerate() {
                    let Ok(dest) = self.destination.path_for(src, self.pending_offset + idx)
                    else {
                        continue;
                    };
                    match self.direction {
                        Direction::Copy => recorder.declare_copy(src, &dest),
                        Direction::Move => recorder.declare_move(src, &dest),
                    }
                    declared = true;
                }
            }
        }
        declared
    }

    // Bookkeeping hooks for the verb runners.

    pub(crate) fn source_offset(&self) -> usize {
        self.pending_offset
    }

    /// Rebind the current targets to a run starting at the head of the
    /// original order (execute always produces a completed prefix).
    pub(crate) fn rebind_sources(&mut self, sources: Vec<WsPath>) {
        self.sources = sources;
        self.pending_offset = 0;
    }

    /// Rebind the current targets to a run starting at `offset` in the
    /// original order (a partially completed undo leaves a suffix).
    pub(crate) fn rebind_sources_at(&mut self, sources: Vec<WsPath>, offset: usize) {
        self.sources = sources;
        self.pending_offset = offset;
    }

    pub(crate) fn push_overwritten(&mut self, snap: ResourceSnapshot) {
        self.overwritten.push(snap);
    }

    pub(crate) fn drop_recreated(&mut self, n: usize) {
        self.overwritten.drain(..n);
    }

    pub(crate) fn clear_overwritten(&mut self) {
        self.overwritten.clear();
    }

    /// Reset live bookkeeping to the construction-time record.
    pub(crate) fn reset_to_original(&mut self) {
        self.sources = self.original_sources.clone();
        self.pending_offset = 0;
        self.destination = self.original_destination.clone();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::changes::ChangeSet;
    use crate::workspace::FsWorkspace;
    use std::fs;
    use std::path::Path;

    fn ws() -> (tempfile::TempDir, FsWorkspace) {
        let td = tempfile::tempdir().unwrap();
        let ws = FsWorkspace::new(td.path().to_path_buf());
        (td, ws)
    }

    fn p(ws: &FsWorkspace, rel: &str) -> WsPath {
        WsPath::from_rooted(ws.root(), Path::new(rel)).unwrap()
    }

    #[test]
    fn construction_snapshots_every_original() {
        let (_td, ws) = ws();
        fs::write(ws.root().join("a"), b"a").unwrap();
        fs::write(ws.root().join("b"), b"b").unwrap();
        fs::create_dir(ws.root().join("out")).unwrap();
        let op = TransferOperation::copy_to(
            &ws,
            vec![p(&ws, "a"), p(&ws, "b")],
            p(&ws, "out"),
            "copy 2",
        )
        .unwrap();
        assert_eq!(op.original_sources().len(), op.original_snapshots().len());
        assert_eq!(op.original_snapshots().len(), 2);
    }

    #[test]
    fn construction_fails_when_a_source_is_missing() {
        let (_td, ws) = ws();
        fs::create_dir(ws.root().join("out")).unwrap();
        let err =
            TransferOperation::copy_to(&ws, vec![p(&ws, "ghost")], p(&ws, "out"), "copy").unwrap_err();
        assert!(matches!(err.kind, crate::types::ErrorKind::Storage));
    }

    #[test]
    fn per_path_count_mismatch_is_rejected() {
        let (_td, ws) = ws();
        fs::write(ws.root().join("a"), b"a").unwrap();
        fs::write(ws.root().join("b"), b"b").unwrap();
        let err = TransferOperation::copy_each(
            &ws,
            vec![p(&ws, "a"), p(&ws, "b")],
            vec![p(&ws, "x")],
            "copy",
        )
        .unwrap_err();
        assert!(matches!(err.kind, crate::types::ErrorKind::Input));
    }

    #[test]
    fn describe_execute_declares_one_copy_per_source() {
        let (_td, ws) = ws();
        fs::write(ws.root().join("a"), b"a").unwrap();
        fs::create_dir(ws.root().join("out")).unwrap();
        let op =
            TransferOperation::copy_to(&ws, vec![p(&ws, "a")], p(&ws, "out"), "copy").unwrap();
        let mut set = ChangeSet::default();
        assert!(op.describe_changes(ChangeDirection::Execute, &mut set));
        assert_eq!(set.changes.len(), 1);
    }

    #[test]
    fn move_each_pairs_paths_with_resources() {
        let (_td, ws) = ws();
        fs::write(ws.root().join("a"), b"a").unwrap();
        fs::write(ws.root().join("b"), b"b").unwrap();
        let op = TransferOperation::move_each(
            &ws,
            vec![p(&ws, "a"), p(&ws, "b")],
            vec![p(&ws, "x"), p(&ws, "y")],
            "move both",
        )
        .unwrap();
        assert_eq!(op.direction(), Direction::Move);
        assert!(matches!(op.destination(), Destination::PerResource(v) if v.len() == 2));

        let err = TransferOperation::move_each(
            &ws,
            vec![p(&ws, "a"), p(&ws, "b")],
            vec![p(&ws, "x")],
            "move both",
        )
        .unwrap_err();
        assert!(matches!(err.kind, crate::types::ErrorKind::Input));
    }

    #[test]
    fn mark_invalid_is_one_way() {
        let (_td, ws) = ws();
        fs::write(ws.root().join("a"), b"a").unwrap();
        let mut op =
            TransferOperation::copy_one(&ws, p(&ws, "a"), p(&ws, "b"), "copy").unwrap();
        assert!(op.is_valid());
        op.mark_invalid();
        assert!(!op.is_valid());
    }
}
