//! Error types used across copyback.
use std::path::Path;

use thiserror::Error;

/// High-level error categories for operations and adapters.
#[derive(Debug, Copy, Clone, Error)]
pub enum ErrorKind {
    #[error("invalid path")]
    InvalidPath,
    #[error("invalid operation state")]
    InvalidState,
    #[error("storage failure")]
    Storage,
    #[error("lock acquisition failed")]
    Locking,
    #[error("invalid input")]
    Input,
}

/// Structured error with a kind and human message.
///
/// Mutating verbs attach the failing resource and phase to the message so a
/// caller can decide whether to retire the operation without unwinding
/// further context.
#[derive(Debug, Error)]
#[error("{kind}: {msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidPath,
            msg: msg.into(),
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidState,
            msg: msg.into(),
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Input,
            msg: msg.into(),
        }
    }

    /// Wrap an underlying storage failure with the phase and path it hit.
    pub fn storage(phase: &str, path: &Path, err: &std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Storage,
            msg: format!("{phase} {}: {err}", path.display()),
        }
    }
}

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;
