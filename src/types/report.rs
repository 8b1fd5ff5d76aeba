use super::wspath::WsPath;

/// Outcome of `execute`/`redo`.
///
/// `cancelled` is not an error: the completed prefix of the transfer is
/// recorded and remains undoable.
#[derive(Clone, Debug, Default)]
pub struct ExecReport {
    /// Destination paths actually produced, in source order.
    pub executed: Vec<WsPath>,
    /// Number of pre-existing resources snapshotted and overwritten.
    pub overwrites: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Outcome of `undo`.
#[derive(Clone, Debug, Default)]
pub struct UndoReport {
    /// Copies removed (or moved back, for a move operation).
    pub reverted: usize,
    /// Overwritten resources recreated from snapshots.
    pub recreated: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}
