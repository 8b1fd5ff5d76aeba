//! Replayable captures of workspace resources.
//!
//! A snapshot is taken of anything a transfer is about to overwrite, and of
//! every original source at construction time. It carries enough to put the
//! resource back exactly: file bytes and mode, symlink destination, or a
//! whole directory tree.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::SNAPSHOT_SCHEMA;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapNode {
    File { bytes: Vec<u8>, mode: u32 },
    Symlink { dest: PathBuf },
    Dir { mode: u32, entries: Vec<(String, SnapNode)> },
}

/// A captured resource, keyed by its root-relative path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub schema: String,
    pub rel: PathBuf,
    pub node: SnapNode,
}

impl ResourceSnapshot {
    /// Capture the resource at `root/rel`. Fails if nothing exists there.
    pub fn capture(root: &Path, rel: &Path) -> io::Result<Self> {
        let node = capture_node(&root.join(rel))?;
        Ok(Self {
            schema: SNAPSHOT_SCHEMA.to_string(),
            rel: rel.to_path_buf(),
            node,
        })
    }

    /// Recreate the captured resource under `root`. The target path must be
    /// free; callers decide whether an occupied path is a conflict.
    pub fn materialize(&self, root: &Path) -> io::Result<()> {
        materialize_node(&root.join(&self.rel), &self.node)
    }
}

fn capture_node(abs: &Path) -> io::Result<SnapNode> {
    let meta = fs::symlink_metadata(abs)?;
    let ft = meta.file_type();
    if ft.is_symlink() {
        return Ok(SnapNode::Symlink {
            dest: fs::read_link(abs)?,
        });
    }
    if ft.is_dir() {
        let mut entries = Vec::new();
        let mut names: Vec<_> = fs::read_dir(abs)?
            .map(|e| e.map(|e| e.file_name()))
            .collect::<io::Result<_>>()?;
        names.sort();
        for name in names {
            let child = capture_node(&abs.join(&name))?;
            entries.push((name.to_string_lossy().into_owned(), child));
        }
        return Ok(SnapNode::Dir {
            mode: meta.permissions().mode(),
            entries,
        });
    }
    Ok(SnapNode::File {
        bytes: fs::read(abs)?,
        mode: meta.permissions().mode(),
    })
}

fn materialize_node(abs: &Path, node: &SnapNode) -> io::Result<()> {
    match node {
        SnapNode::File { bytes, mode } => {
            fs::write(abs, bytes)?;
            fs::set_permissions(abs, fs::Permissions::from_mode(*mode))?;
        }
        SnapNode::Symlink { dest } => {
            std::os::unix::fs::symlink(dest, abs)?;
        }
        SnapNode::Dir { mode, entries } => {
            fs::create_dir(abs)?;
            for (name, child) in entries {
                materialize_node(&abs.join(name), child)?;
            }
            fs::set_permissions(abs, fs::Permissions::from_mode(*mode))?;
        }
    }
    Ok(())
}
