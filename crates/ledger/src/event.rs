use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, EventId, ItemId, UserId};

use crate::item::Item;

/// Kind of quantity change.
///
/// Closed set so every call site is exhaustively checked. The sign of the
/// delta is implied by the kind for inbound/outbound; adjustments carry an
/// explicit signed delta.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Inbound,
    Outbound,
    Adjustment,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Inbound => "inbound",
            EventKind::Outbound => "outbound",
            EventKind::Adjustment => "adjustment",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable row of the quantity ledger.
///
/// # Invariants
/// - `quantity_after = quantity_before + quantity_delta`
/// - `quantity_after >= 0`
/// - Per item, `quantity_before` of row n+1 equals `quantity_after` of row n:
///   the ledger is a strictly ordered, gapless chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityEvent {
    pub id: EventId,
    pub item_id: ItemId,
    pub kind: EventKind,
    pub quantity_before: i64,
    pub quantity_delta: i64,
    pub quantity_after: i64,
    pub note: Option<String>,
    pub actor: Option<UserId>,
    pub recorded_at: DateTime<Utc>,
}

/// A ledger row ready to append (no id yet; the store assigns it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub item_id: ItemId,
    pub kind: EventKind,
    pub quantity_before: i64,
    pub quantity_delta: i64,
    pub quantity_after: i64,
    pub note: Option<String>,
    pub actor: Option<UserId>,
    pub recorded_at: DateTime<Utc>,
}

/// Normalize the delta sign for the given kind.
///
/// Inbound coerces positive, outbound negative, adjustments pass through as
/// given. A zero delta is meaningless in the ledger and is rejected.
fn normalize_delta(kind: EventKind, delta: i64) -> DomainResult<i64> {
    if delta == 0 {
        return Err(DomainError::invalid_transition(format!(
            "{kind} event requires a non-zero quantity_delta"
        )));
    }

    Ok(match kind {
        EventKind::Inbound => delta.abs(),
        EventKind::Outbound => -delta.abs(),
        EventKind::Adjustment => delta,
    })
}

/// Apply one quantity event to an item, pure.
///
/// Returns the updated item (new quantity, re-projected status, touched
/// audit fields) together with the ledger row to append. The two must be
/// committed as a single unit of work so no reader ever observes an item
/// whose quantity disagrees with its last ledger row.
pub fn apply_event(
    item: &Item,
    kind: EventKind,
    delta: i64,
    note: Option<String>,
    actor: Option<UserId>,
    at: DateTime<Utc>,
) -> DomainResult<(Item, EventDraft)> {
    if item.is_deleted {
        return Err(DomainError::not_found(format!(
            "item {} is deleted",
            item.sku
        )));
    }

    let signed = normalize_delta(kind, delta)?;
    let quantity_before = item.quantity;
    let quantity_after = quantity_before + signed;

    if quantity_after < 0 {
        return Err(DomainError::invalid_transition(format!(
            "insufficient quantity: current {quantity_before}, delta {signed}"
        )));
    }

    let mut updated = item.clone();
    updated.quantity = quantity_after;
    updated.status = updated.project_status(true);
    updated.updated_by = actor;
    updated.updated_at = at;

    let draft = EventDraft {
        item_id: item.id,
        kind,
        quantity_before,
        quantity_delta: signed,
        quantity_after,
        note,
        actor,
        recorded_at: at,
    };

    Ok((updated, draft))
}

/// Replay a single item's ledger, verifying chain integrity.
///
/// Returns the reconstructed final quantity. Events must be the full,
/// ordered history for one item (the first row's `quantity_before` is the
/// creation quantity baseline).
pub fn replay(events: &[QuantityEvent]) -> DomainResult<i64> {
    let mut cursor: Option<i64> = None;

    for event in events {
        if event.quantity_before + event.quantity_delta != event.quantity_after {
            return Err(DomainError::invalid_transition(format!(
                "ledger row {} arithmetic is inconsistent",
                event.id
            )));
        }
        if event.quantity_after < 0 {
            return Err(DomainError::invalid_transition(format!(
                "ledger row {} drives quantity negative",
                event.id
            )));
        }
        if let Some(expected) = cursor {
            if event.quantity_before != expected {
                return Err(DomainError::invalid_transition(format!(
                    "ledger chain broken at row {}: expected before={expected}, found {}",
                    event.id, event.quantity_before
                )));
            }
        }
        cursor = Some(event.quantity_after);
    }

    Ok(cursor.unwrap_or(0))
}
