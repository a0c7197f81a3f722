//! `stockline-audit` — the immutable audit trail.
//!
//! One entry per committed mutation, drafted inside the same unit of work as
//! the mutation itself: a failed mutation records nothing, a successful one
//! records exactly one entry. Entries are append-only and carry serialized
//! before/after snapshots of the affected entity.

pub mod entry;
pub mod snapshot;

pub use entry::{AuditAction, AuditDraft, AuditEntry, EntityKind, MAX_RECENT};
pub use snapshot::{item_snapshot, user_snapshot};
