use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockline_core::{AuditId, UserId};

/// Upper bound on `recent(limit)` reads, protecting memory on hot paths.
pub const MAX_RECENT: usize = 200;

/// Kind of entity an audit entry refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Item,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::User => "user",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed vocabulary of audited actions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "ITEM_CREATE")]
    ItemCreate,
    #[serde(rename = "ITEM_UPDATE")]
    ItemUpdate,
    #[serde(rename = "ITEM_DELETE")]
    ItemDelete,
    #[serde(rename = "ITEM_STATUS_UPDATE")]
    ItemStatusUpdate,
    #[serde(rename = "ITEM_STATUS_BULK_UPDATE")]
    ItemStatusBulkUpdate,
    #[serde(rename = "ITEM_QUANTITY_ADJUST")]
    ItemQuantityAdjust,
    #[serde(rename = "USER_ROLE_UPDATE")]
    UserRoleUpdate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ItemCreate => "ITEM_CREATE",
            AuditAction::ItemUpdate => "ITEM_UPDATE",
            AuditAction::ItemDelete => "ITEM_DELETE",
            AuditAction::ItemStatusUpdate => "ITEM_STATUS_UPDATE",
            AuditAction::ItemStatusBulkUpdate => "ITEM_STATUS_BULK_UPDATE",
            AuditAction::ItemQuantityAdjust => "ITEM_QUANTITY_ADJUST",
            AuditAction::UserRoleUpdate => "USER_ROLE_UPDATE",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed audit entry. Append-only; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditId,
    pub entity: EntityKind,
    pub entity_id: Option<i64>,
    pub action: AuditAction,
    pub before: Option<JsonValue>,
    pub after: Option<JsonValue>,
    pub note: Option<String>,
    pub actor: Option<UserId>,
    pub recorded_at: DateTime<Utc>,
}

/// An audit entry ready to commit (id/timestamp assigned by the store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub entity: EntityKind,
    pub entity_id: Option<i64>,
    pub action: AuditAction,
    pub before: Option<JsonValue>,
    pub after: Option<JsonValue>,
    pub note: Option<String>,
    pub actor: Option<UserId>,
}

impl AuditDraft {
    pub fn new(entity: EntityKind, entity_id: Option<i64>, action: AuditAction) -> Self {
        Self {
            entity,
            entity_id,
            action,
            before: None,
            after: None,
            note: None,
            actor: None,
        }
    }

    pub fn item(entity_id: i64, action: AuditAction) -> Self {
        Self::new(EntityKind::Item, Some(entity_id), action)
    }

    pub fn user(entity_id: i64, action: AuditAction) -> Self {
        Self::new(EntityKind::User, Some(entity_id), action)
    }

    pub fn with_before(mut self, before: JsonValue) -> Self {
        self.before = Some(before);
        self
    }

    pub fn with_after(mut self, after: JsonValue) -> Self {
        self.after = Some(after);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn by(mut self, actor: Option<UserId>) -> Self {
        self.actor = actor;
        self
    }
}
