//! Change-description recording: a planned set of resource mutations for
//! preview and validation, accumulated without performing anything.

use crate::types::WsPath;
use crate::workspace::ResourceSnapshot;

/// Which effect a preview should describe. Redo re-applies execute's
/// effect, so the execute direction covers both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeDirection {
    Execute,
    Undo,
}

/// One planned mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Delete(WsPath),
    /// Creation of a resource from a snapshot (its relative path names the
    /// location).
    Create(std::path::PathBuf),
    Copy { from: WsPath, to: WsPath },
    Move { from: WsPath, to: WsPath },
}

/// Collaborator that accumulates planned mutations.
pub trait ChangeRecorder {
    fn declare_delete(&mut self, p: &WsPath);
    fn declare_create(&mut self, snap: &ResourceSnapshot);
    fn declare_copy(&mut self, from: &WsPath, to: &WsPath);
    fn declare_move(&mut self, from: &WsPath, to: &WsPath);
}

/// Vec-backed recorder, good enough for previews and tests.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    pub changes: Vec<Change>,
}

impl ChangeRecorder for ChangeSet {
    fn declare_delete(&mut self, p: &WsPath) {
        self.changes.push(Change::Delete(p.clone()));
    }

    fn declare_create(&mut self, snap: &ResourceSnapshot) {
        self.changes.push(Change::Create(snap.rel.clone()));
    }

    fn declare_copy(&mut self, from: &WsPath, to: &WsPath) {
        self.changes.push(Change::Copy {
            from: from.clone(),
            to: to.clone(),
        });
    }

    fn declare_move(&mut self, from: &WsPath, to: &WsPath) {
        self.changes.push(Change::Move {
            from: from.clone(),
            to: to.clone(),
        });
    }
}
