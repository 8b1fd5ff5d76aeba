use std::path::{Component, Path, PathBuf};

use super::errors::{Error, Result};

/// A workspace-rooted path: an absolute root plus a normalized relative
/// component that cannot escape the root.
///
/// All resource handles in this crate are `WsPath`s; existence at the
/// location is dynamic and checked through the workspace store, never here.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WsPath {
    root: PathBuf,
    rel: PathBuf,
}

impl WsPath {
    /// Build a `WsPath` from a root and a candidate path.
    ///
    /// The candidate may be absolute (it must then lie inside the root) or
    /// relative to the root. `.` components are dropped; `..` and other
    /// non-normal components are rejected.
    pub fn from_rooted(root: &Path, candidate: &Path) -> Result<Self> {
        if !root.is_absolute() {
            return Err(Error::invalid_path("root must be absolute"));
        }
        let effective = if candidate.is_absolute() {
            match candidate.strip_prefix(root) {
                Ok(p) => p.to_path_buf(),
                Err(_) => return Err(Error::invalid_path("path escapes root")),
            }
        } else {
            candidate.to_path_buf()
        };

        let mut rel = PathBuf::new();
        for seg in effective.components() {
            match seg {
                Component::CurDir => {}
                Component::Normal(p) => rel.push(p),
                Component::ParentDir => {
                    return Err(Error::invalid_path("dotdot component"));
                }
                _ => {
                    return Err(Error::invalid_path("unsupported component"));
                }
            }
        }
        Ok(WsPath {
            root: root.to_path_buf(),
            rel,
        })
    }

    /// Full path (root joined with the relative component).
    #[must_use]
    pub fn as_path(&self) -> PathBuf {
        self.root.join(&self.rel)
    }

    #[must_use]
    pub fn rel(&self) -> &Path {
        &self.rel
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path component, when there is one.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.rel.file_name().and_then(|s| s.to_str())
    }

    /// Parent location within the same root. The workspace root itself has
    /// no parent and the root's direct children have the root (empty rel).
    #[must_use]
    pub fn parent(&self) -> Option<WsPath> {
        self.rel.parent().map(|p| WsPath {
            root: self.root.clone(),
            rel: p.to_path_buf(),
        })
    }

    /// Append a single name component (e.g. to place a resource inside a
    /// shared destination container). Separators and `..` are rejected.
    pub fn join_name(&self, name: &str) -> Result<Self> {
        if name.is_empty() || name == ".." || name.contains('/') {
            return Err(Error::invalid_path(format!("bad name component: {name}")));
        }
        let mut rel = self.rel.clone();
        rel.push(name);
        Ok(WsPath {
            root: self.root.clone(),
            rel,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dotdot() {
        let root = Path::new("/tmp");
        assert!(WsPath::from_rooted(root, Path::new("../etc")).is_err());
    }

    #[test]
    fn accepts_absolute_inside_root() {
        let root = Path::new("/tmp/root");
        let p = WsPath::from_rooted(root, Path::new("/tmp/root/a/b")).unwrap();
        assert_eq!(p.rel(), Path::new("a/b"));
        assert_eq!(p.as_path(), Path::new("/tmp/root/a/b"));
    }

    #[test]
    fn rejects_absolute_outside_root() {
        let root = Path::new("/tmp/root");
        assert!(WsPath::from_rooted(root, Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn join_name_rejects_separators() {
        let root = Path::new("/tmp/root");
        let p = WsPath::from_rooted(root, Path::new("dir")).unwrap();
        assert!(p.join_name("a/b").is_err());
        assert!(p.join_name("..").is_err());
        assert_eq!(p.join_name("c").unwrap().rel(), Path::new("dir/c"));
    }

    #[test]
    fn parent_and_file_name() {
        let root = Path::new("/tmp/root");
        let p = WsPath::from_rooted(root, Path::new("a/b/c")).unwrap();
        assert_eq!(p.file_name(), Some("c"));
        assert_eq!(p.parent().unwrap().rel(), Path::new("a/b"));
    }
}
