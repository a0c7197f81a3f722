use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use stockline_audit::MAX_RECENT;
use stockline_auth::{Role, UserAccount};
use stockline_engines::Decision;
use stockline_ledger::{
    EventKind, ItemDraft, ItemFilter, ItemStatus, SortDir, SortField,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub details: Option<String>,
    pub quantity: i64,
    pub reorder_threshold: i64,
    pub unit_cost: f64,
    pub status: Option<ItemStatus>,
}

impl CreateItemRequest {
    pub fn into_draft(self) -> ItemDraft {
        ItemDraft {
            sku: self.sku,
            name: self.name,
            category: self.category,
            details: self.details,
            quantity: self.quantity,
            reorder_threshold: self.reorder_threshold,
            unit_cost: self.unit_cost,
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuantityAdjustmentRequest {
    pub event_type: EventKind,
    pub quantity_delta: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemStatusUpdateRequest {
    pub status: ItemStatus,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusUpdateRequest {
    pub item_ids: Vec<i64>,
    pub status: ItemStatus,
}

#[derive(Debug, Deserialize)]
pub struct NaturalLanguageSearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

/// Query string for item listing/search.
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<ItemStatus>,
    pub min_qty: Option<i64>,
    pub max_qty: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListItemsQuery {
    pub fn filter(&self) -> ItemFilter {
        ItemFilter {
            q: self.q.clone(),
            category: self.category.clone(),
            status: self.status,
            min_qty: self.min_qty,
            max_qty: self.max_qty,
            include_deleted: self.include_deleted,
        }
    }

    pub fn sort(&self) -> (SortField, SortDir) {
        (
            SortField::parse_or_default(self.sort_by.as_deref().unwrap_or("updated_at")),
            SortDir::parse_or_default(self.sort_dir.as_deref().unwrap_or("desc")),
        )
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(25).clamp(1, 200)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

impl AuditQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(50).clamp(1, MAX_RECENT)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReorderQuery {
    pub limit: Option<usize>,
}

impl ReorderQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnomalyQuery {
    pub days: Option<i64>,
    pub limit: Option<usize>,
}

impl AnomalyQuery {
    pub fn days(&self) -> i64 {
        self.days.unwrap_or(30).clamp(1, 365)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

// -------------------------
// Response mapping
// -------------------------

/// Serialize a decision as `{source, model, <key>: payload}`.
pub fn decision_envelope<T: Serialize>(decision: &Decision<T>, key: &str) -> JsonValue {
    json!({
        "source": decision.source(),
        "model": decision.model(),
        key: decision.payload(),
    })
}

/// User representation for responses. API keys never leave the process.
pub fn user_to_json(user: &UserAccount) -> JsonValue {
    json!({
        "id": user.id,
        "username": user.username,
        "full_name": user.full_name,
        "role": user.role,
        "is_active": user.is_active,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })
}
