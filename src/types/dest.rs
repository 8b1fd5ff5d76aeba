use super::errors::{Error, Result};
use super::wspath::WsPath;

/// Where a transfer lands.
///
/// Exactly one shape is representable at a time, which makes the old
/// "one of two nullable fields" invariant structural: either every source
/// goes under one shared container (names preserved), or each source has
/// its own full destination path (name included).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// One container; each source keeps its name inside it.
    Shared(WsPath),
    /// One full path per source, index-aligned with the source list.
    PerResource(Vec<WsPath>),
}

impl Destination {
    /// Resolve the destination path for the `idx`-th source.
    pub fn path_for(&self, source: &WsPath, idx: usize) -> Result<WsPath> {
        match self {
            Destination::Shared(dir) => {
                let name = source
                    .file_name()
                    .ok_or_else(|| Error::invalid_path("source has no name"))?;
                dir.join_name(name)
            }
            Destination::PerResource(paths) => paths.get(idx).cloned().ok_or_else(|| {
                Error::input(format!("no destination path for source index {idx}"))
            }),
        }
    }

    /// Whether this destination can serve `n` sources.
    #[must_use]
    pub fn covers(&self, n: usize) -> bool {
        match self {
            Destination::Shared(_) => true,
            Destination::PerResource(paths) => paths.len() == n,
        }
    }
}
