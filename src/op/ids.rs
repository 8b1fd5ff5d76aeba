//! Deterministic UUIDv5 identifiers for operations.
//!
//! The namespace is derived from a stable tag (`NS_TAG`) so the same
//! direction/source/destination shape yields the same `op_id` across runs,
//! independent of the workspace root.

use uuid::Uuid;

use crate::constants::NS_TAG;
use crate::types::{Destination, WsPath};

use super::{Direction, TransferOperation};

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

fn rel(p: &WsPath) -> String {
    p.rel().to_string_lossy().to_string()
}

fn serialize(op: &TransferOperation) -> String {
    let tag = match op.direction() {
        Direction::Copy => 'C',
        Direction::Move => 'M',
    };
    let mut s = String::new();
    s.push(tag);
    s.push(':');
    for src in op.original_sources() {
        s.push_str(&rel(src));
        s.push(';');
    }
    s.push_str("->");
    match op.destination() {
        Destination::Shared(dir) => {
            s.push('S');
            s.push_str(&rel(dir));
        }
        Destination::PerResource(paths) => {
            s.push('P');
            for p in paths {
                s.push_str(&rel(p));
                s.push(';');
            }
        }
    }
    s
}

/// Compute a deterministic UUIDv5 for an operation from its original
/// sources and current destination shape.
#[must_use]
pub fn op_id(op: &TransferOperation) -> Uuid {
    Uuid::new_v5(&namespace(), serialize(op).as_bytes())
}
