//! `stockline-ledger` — the quantity ledger and item state projector.
//!
//! Source of truth for "how much do we have and how did it get there":
//! - [`Item`] is the derived projection (current quantity + lifecycle status).
//! - [`QuantityEvent`] is the immutable per-item ledger row.
//! - [`apply_event`] is the single pure entry point for quantity changes; it
//!   enforces the non-negative invariant and re-derives status.
//! - [`filter`] is the one item-filtering implementation shared by the
//!   standard search path and the natural-language path.
//!
//! Everything here is pure: callers pass fully materialized snapshots and
//! timestamps in, nothing triggers hidden I/O.

pub mod event;
pub mod filter;
pub mod item;

pub use event::{apply_event, replay, EventDraft, EventKind, QuantityEvent};
pub use filter::{search, ItemFilter, SearchPage, SortDir, SortField};
pub use item::{Item, ItemDraft, ItemStatus};
