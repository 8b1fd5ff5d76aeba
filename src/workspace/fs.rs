//! Rooted filesystem implementation of the workspace store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustix::fs::{Access, Mode, OFlags};
use walkdir::WalkDir;

use crate::types::WsPath;

use super::snapshot::ResourceSnapshot;
use super::Workspace;

/// A workspace backed by a directory tree on the local filesystem.
///
/// Mutations fsync the parent directory afterwards so a completed verb is
/// durable across a crash.
#[derive(Debug)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Best-effort fsync of a path's parent directory.
pub(crate) fn fsync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let fd = rustix::fs::open(parent, OFlags::RDONLY | OFlags::DIRECTORY, Mode::empty())
        .map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))?;
    rustix::fs::fsync(&fd).map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))?;
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let out = dest.join(rel);
        let ft = entry.file_type();
        if ft.is_dir() {
            fs::create_dir_all(&out)?;
        } else if ft.is_symlink() {
            let link = fs::read_link(entry.path())?;
            std::os::unix::fs::symlink(link, &out)?;
        } else {
            fs::copy(entry.path(), &out)?;
        }
    }
    Ok(())
}

impl Workspace for FsWorkspace {
    fn exists(&self, p: &WsPath) -> bool {
        fs::symlink_metadata(p.as_path()).is_ok()
    }

    fn parent_exists(&self, p: &WsPath) -> bool {
        p.as_path()
            .parent()
            .map(|parent| parent.is_dir())
            .unwrap_or(false)
    }

    fn is_writable(&self, p: &WsPath) -> bool {
        let abs = p.as_path();
        let Some(parent) = abs.parent() else {
            return false;
        };
        parent.is_dir() && rustix::fs::access(parent, Access::WRITE_OK).is_ok()
    }

    fn copy(&self, src: &WsPath, dest: &WsPath) -> io::Result<()> {
        let from = src.as_path();
        let to = dest.as_path();
        let meta = fs::symlink_metadata(&from)?;
        let ft = meta.file_type();
        if ft.is_dir() {
            copy_tree(&from, &to)?;
        } else if ft.is_symlink() {
            let link = fs::read_link(&from)?;
            std::os::unix::fs::symlink(link, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
        let _ = fsync_parent_dir(&to);
        Ok(())
    }

    fn remove(&self, p: &WsPath) -> io::Result<()> {
        let abs = p.as_path();
        let meta = fs::symlink_metadata(&abs)?;
        if meta.file_type().is_dir() {
            fs::remove_dir_all(&abs)?;
        } else {
            fs::remove_file(&abs)?;
        }
        let _ = fsync_parent_dir(&abs);
        Ok(())
    }

    fn snapshot(&self, p: &WsPath) -> io::Result<ResourceSnapshot> {
        ResourceSnapshot::capture(&self.root, p.rel())
    }

    fn recreate(&self, snap: &ResourceSnapshot) -> io::Result<()> {
        snap.materialize(&self.root)?;
        let _ = fsync_parent_dir(&self.root.join(&snap.rel));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ws() -> (tempfile::TempDir, FsWorkspace) {
        let td = tempfile::tempdir().unwrap();
        let ws = FsWorkspace::new(td.path().to_path_buf());
        (td, ws)
    }

    fn p(ws: &FsWorkspace, rel: &str) -> WsPath {
        WsPath::from_rooted(ws.root(), Path::new(rel)).unwrap()
    }

    #[test]
    fn copy_and_remove_file() {
        let (_td, ws) = ws();
        fs::write(ws.root().join("a"), b"hello").unwrap();
        let src = p(&ws, "a");
        let dst = p(&ws, "b");
        ws.copy(&src, &dst).unwrap();
        assert!(ws.exists(&dst));
        assert_eq!(fs::read(ws.root().join("b")).unwrap(), b"hello");
        ws.remove(&dst).unwrap();
        assert!(!ws.exists(&dst));
        assert!(ws.exists(&src), "source untouched by copy");
    }

    #[test]
    fn copy_directory_recursively() {
        let (_td, ws) = ws();
        fs::create_dir_all(ws.root().join("d/sub")).unwrap();
        fs::write(ws.root().join("d/sub/f"), b"x").unwrap();
        ws.copy(&p(&ws, "d"), &p(&ws, "e")).unwrap();
        assert_eq!(fs::read(ws.root().join("e/sub/f")).unwrap(), b"x");
    }

    #[test]
    fn writable_checks_follow_parent() {
        let (_td, ws) = ws();
        fs::create_dir_all(ws.root().join("dir")).unwrap();
        assert!(ws.is_writable(&p(&ws, "dir/new")));
        assert!(!ws.is_writable(&p(&ws, "missing/new")));
        assert!(!ws.parent_exists(&p(&ws, "missing/new")));
    }

    #[test]
    fn snapshot_recreate_round_trip() {
        let (_td, ws) = ws();
        fs::write(ws.root().join("f"), b"old").unwrap();
        let f = p(&ws, "f");
        let snap = ws.snapshot(&f).unwrap();
        ws.remove(&f).unwrap();
        ws.recreate(&snap).unwrap();
        assert_eq!(fs::read(ws.root().join("f")).unwrap(), b"old");
    }
}
