pub mod lock;
pub mod lock_file;

pub use lock::{LockGuard, LockManager};
pub use lock_file::FileLockManager;
