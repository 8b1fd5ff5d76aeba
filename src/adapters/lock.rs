use crate::types::Result;

/// Token representing held exclusive access to the workspace. Dropping it
/// releases the lock, so release happens on every exit path.
pub trait LockGuard: Send {}

pub trait LockManager: Send + Sync {
    fn acquire_workspace_lock(&self, timeout_ms: u64) -> Result<Box<dyn LockGuard>>;
}
