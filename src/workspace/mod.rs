//! The workspace store: the collaborator that actually holds resources.
//!
//! Operations never touch the filesystem directly; they go through the
//! [`Workspace`] trait so tests can interpose faults and so alternative
//! stores remain possible.

pub mod fs;
pub mod snapshot;

pub use fs::FsWorkspace;
pub use snapshot::{ResourceSnapshot, SnapNode};

use std::io;

use crate::types::WsPath;

pub trait Workspace: Send + Sync {
    /// Whether a resource currently exists at the location.
    fn exists(&self, p: &WsPath) -> bool;

    /// Whether the location's parent container currently exists.
    fn parent_exists(&self, p: &WsPath) -> bool;

    /// Whether a resource could be created or removed at the location
    /// (parent exists and is writable). Re-checked lazily on every call.
    fn is_writable(&self, p: &WsPath) -> bool;

    /// Copy the resource at `src` to `dest` (recursively for containers).
    fn copy(&self, src: &WsPath, dest: &WsPath) -> io::Result<()>;

    /// Remove the resource at `p` (recursively for containers).
    fn remove(&self, p: &WsPath) -> io::Result<()>;

    /// Capture a replayable snapshot of the resource at `p`.
    fn snapshot(&self, p: &WsPath) -> io::Result<ResourceSnapshot>;

    /// Recreate a previously captured resource. The target path must be
    /// free.
    fn recreate(&self, snap: &ResourceSnapshot) -> io::Result<()>;
}
