//! Structured status values returned by the status-computation queries.
//!
//! Status queries never return `Err`: UI layers want a renderable reason
//! without unwinding, so blockage is data, not an error.

/// Stable identifiers for blocked statuses, emitted verbatim in facts.
#[allow(non_camel_case_types, reason = "IDs match the emitted fact strings")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCode {
    E_INVALID_STATE,
    E_PARTIAL_TRANSFER,
    E_MISSING_SOURCE,
    E_DEST_PARENT,
    E_DEST_NOT_WRITABLE,
    E_SNAPSHOT_CONFLICT,
}

#[must_use]
pub const fn code_str(code: StatusCode) -> &'static str {
    match code {
        StatusCode::E_INVALID_STATE => "E_INVALID_STATE",
        StatusCode::E_PARTIAL_TRANSFER => "E_PARTIAL_TRANSFER",
        StatusCode::E_MISSING_SOURCE => "E_MISSING_SOURCE",
        StatusCode::E_DEST_PARENT => "E_DEST_PARENT",
        StatusCode::E_DEST_NOT_WRITABLE => "E_DEST_NOT_WRITABLE",
        StatusCode::E_SNAPSHOT_CONFLICT => "E_SNAPSHOT_CONFLICT",
    }
}

/// Result of a status query. Recomputed lazily on every call; nothing in
/// here is cached because the workspace can change between queueing and
/// invocation.
#[derive(Clone, Debug)]
pub enum OpStatus {
    Ok,
    Blocked { code: StatusCode, reason: String },
}

impl OpStatus {
    #[must_use]
    pub fn blocked(code: StatusCode, reason: impl Into<String>) -> Self {
        OpStatus::Blocked {
            code,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, OpStatus::Ok)
    }

    #[must_use]
    pub fn code(&self) -> Option<StatusCode> {
        match self {
            OpStatus::Ok => None,
            OpStatus::Blocked { code, .. } => Some(*code),
        }
    }
}
