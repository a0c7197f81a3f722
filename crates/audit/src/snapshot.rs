//! Before/after entity snapshots.
//!
//! Snapshots are plain JSON values so audit entries stay readable without
//! the live types, and survive schema drift in the entities themselves.

use serde_json::{json, Value as JsonValue};

use stockline_auth::UserAccount;
use stockline_ledger::Item;

/// Serialize the audited view of an item.
pub fn item_snapshot(item: &Item) -> JsonValue {
    json!({
        "id": item.id,
        "sku": item.sku,
        "name": item.name,
        "category": item.category,
        "details": item.details,
        "quantity": item.quantity,
        "reorder_threshold": item.reorder_threshold,
        "unit_cost": item.unit_cost,
        "status": item.status,
        "is_deleted": item.is_deleted,
        "updated_at": item.updated_at,
    })
}

/// Serialize the audited view of a user account. The API key never lands in
/// the audit trail.
pub fn user_snapshot(user: &UserAccount) -> JsonValue {
    json!({
        "id": user.id,
        "username": user.username,
        "role": user.role,
        "is_active": user.is_active,
    })
}
