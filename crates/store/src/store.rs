use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockline_audit::{AuditDraft, AuditEntry};
use stockline_auth::UserAccount;
use stockline_core::{DomainError, ItemId, UserId};
use stockline_ledger::{EventDraft, Item, QuantityEvent};

/// Storage operation error.
///
/// These are persistence-level failures, distinct from domain validation:
/// a `ChainViolation` means a ledger row was offered whose `quantity_before`
/// does not match the quantity currently on record for the item, which is
/// exactly what a lost-update race between two writers looks like.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("ledger chain violation: {0}")]
    ChainViolation(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => DomainError::NotFound(msg),
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::ChainViolation(msg) => DomainError::Conflict(msg),
            StoreError::Storage(msg) => DomainError::Conflict(msg),
        }
    }
}

/// Persistence seam for items, the quantity ledger, audit and users.
///
/// ## Commit semantics
///
/// - `create_item` / `persist_item` / `persist_bulk` commit their arguments
///   as one unit of work. No reader may observe the item without its ledger
///   row or audit entry, and a failure leaves the store untouched.
/// - Ledger appends are chain-checked: the row's `quantity_before` must equal
///   the item quantity currently on record, otherwise `ChainViolation`.
/// - Audit drafts are stamped by the store: it assigns the entry id and
///   timestamp. When the entity itself is created in the same commit, the
///   store also overwrites `entity_id` (and an `id` field in the `after`
///   payload, when present) with the id it assigned.
/// - The ledger and the audit trail are append-only. There is no API to
///   update or delete a committed row.
pub trait Store: Send + Sync {
    /// Insert a new item, assigning its id, and commit the audit entry with it.
    ///
    /// Fails with `Conflict` when the SKU is already taken.
    fn create_item(&self, item: Item, audit: AuditDraft) -> Result<Item, StoreError>;

    /// Commit an updated item, its optional ledger row and its audit entry
    /// as one unit of work.
    fn persist_item(
        &self,
        item: Item,
        event: Option<EventDraft>,
        audit: AuditDraft,
    ) -> Result<(Item, Option<QuantityEvent>), StoreError>;

    /// Commit a batch of updated items and their audit entries atomically.
    /// Used by bulk operations that must be all-or-nothing.
    fn persist_bulk(&self, batch: Vec<(Item, AuditDraft)>) -> Result<Vec<Item>, StoreError>;

    fn item(&self, id: ItemId) -> Result<Item, StoreError>;

    fn item_by_sku(&self, sku: &str) -> Option<Item>;

    /// Point-in-time copy of every item, deleted ones included.
    fn items_snapshot(&self) -> Vec<Item>;

    /// Ledger rows, oldest first, optionally filtered by item and/or a lower
    /// bound on `recorded_at`.
    fn events_since(
        &self,
        item_id: Option<ItemId>,
        since: Option<DateTime<Utc>>,
    ) -> Vec<QuantityEvent>;

    /// Append a standalone audit entry (one not tied to an item commit).
    fn record_audit(&self, draft: AuditDraft) -> Result<AuditEntry, StoreError>;

    /// Most recent audit entries, newest first. Implementations cap `limit`
    /// at [`stockline_audit::MAX_RECENT`].
    fn recent_audit(&self, limit: usize) -> Vec<AuditEntry>;

    /// Insert a new user account, assigning its id.
    ///
    /// Fails with `Conflict` when the username is already taken.
    fn create_user(&self, user: UserAccount) -> Result<UserAccount, StoreError>;

    /// Commit an updated user account, with its audit entry when one applies.
    fn persist_user(
        &self,
        user: UserAccount,
        audit: Option<AuditDraft>,
    ) -> Result<UserAccount, StoreError>;

    fn user(&self, id: UserId) -> Result<UserAccount, StoreError>;

    fn user_by_api_key(&self, api_key: &str) -> Option<UserAccount>;

    fn users_snapshot(&self) -> Vec<UserAccount>;
}

impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    fn create_item(&self, item: Item, audit: AuditDraft) -> Result<Item, StoreError> {
        (**self).create_item(item, audit)
    }

    fn persist_item(
        &self,
        item: Item,
        event: Option<EventDraft>,
        audit: AuditDraft,
    ) -> Result<(Item, Option<QuantityEvent>), StoreError> {
        (**self).persist_item(item, event, audit)
    }

    fn persist_bulk(&self, batch: Vec<(Item, AuditDraft)>) -> Result<Vec<Item>, StoreError> {
        (**self).persist_bulk(batch)
    }

    fn item(&self, id: ItemId) -> Result<Item, StoreError> {
        (**self).item(id)
    }

    fn item_by_sku(&self, sku: &str) -> Option<Item> {
        (**self).item_by_sku(sku)
    }

    fn items_snapshot(&self) -> Vec<Item> {
        (**self).items_snapshot()
    }

    fn events_since(
        &self,
        item_id: Option<ItemId>,
        since: Option<DateTime<Utc>>,
    ) -> Vec<QuantityEvent> {
        (**self).events_since(item_id, since)
    }

    fn record_audit(&self, draft: AuditDraft) -> Result<AuditEntry, StoreError> {
        (**self).record_audit(draft)
    }

    fn recent_audit(&self, limit: usize) -> Vec<AuditEntry> {
        (**self).recent_audit(limit)
    }

    fn create_user(&self, user: UserAccount) -> Result<UserAccount, StoreError> {
        (**self).create_user(user)
    }

    fn persist_user(
        &self,
        user: UserAccount,
        audit: Option<AuditDraft>,
    ) -> Result<UserAccount, StoreError> {
        (**self).persist_user(user, audit)
    }

    fn user(&self, id: UserId) -> Result<UserAccount, StoreError> {
        (**self).user(id)
    }

    fn user_by_api_key(&self, api_key: &str) -> Option<UserAccount> {
        (**self).user_by_api_key(api_key)
    }

    fn users_snapshot(&self) -> Vec<UserAccount> {
        (**self).users_snapshot()
    }
}
