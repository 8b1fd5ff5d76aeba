#![forbid(unsafe_code)]
//! Copyback: reversible copy/move of workspace resources.
//!
//! A [`TransferOperation`] records one user-initiated copy (or move) of N
//! resources to a destination and can be executed, undone, and redone by an
//! external undo-history controller. Undo restores the workspace exactly,
//! including resources the transfer overwrote: anything about to be
//! clobbered is snapshotted before the overwrite happens.
//!
//! Model highlights:
//! - Mutations go through a [`Workspace`](workspace::Workspace) store trait;
//!   the shipped [`FsWorkspace`](workspace::FsWorkspace) is rooted at a
//!   directory and fsyncs parent directories after mutating.
//! - Each verb is a scoped critical section: an optional
//!   [`LockManager`](adapters::LockManager) guard is held for the duration
//!   of the call and released on every exit path.
//! - Status queries never fail; they return a structured
//!   [`OpStatus`](types::OpStatus) with a stable `E_*` code.

pub mod constants;
pub mod adapters;
pub mod api;
pub mod changes;
pub mod logging;
pub mod op;
pub mod progress;
pub mod types;
pub mod workspace;

pub use api::Copyback;
pub use op::{Direction, TransferOperation};
