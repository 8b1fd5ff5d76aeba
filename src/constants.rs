//! Shared crate-wide constants.
//!
//! Centralizes magic values and default labels used across modules.

/// Default lock timeout used by `Copyback::new()` unless overridden by
/// `with_lock_timeout_ms()`.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Poll interval in milliseconds for the file-backed lock manager
/// (see `adapters/lock_file.rs`).
pub const LOCK_POLL_MS: u64 = 25;

/// UUIDv5 namespace tag for deterministic operation IDs.
pub const NS_TAG: &str = "https://copyback/op-ids";

/// Schema tag carried by serialized resource snapshots.
pub const SNAPSHOT_SCHEMA: &str = "snapshot.v1";
