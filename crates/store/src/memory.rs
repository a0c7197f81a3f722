use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stockline_audit::{AuditDraft, AuditEntry, MAX_RECENT};
use stockline_auth::UserAccount;
use stockline_core::{AuditId, EventId, ItemId, UserId};
use stockline_ledger::{EventDraft, Item, QuantityEvent};

use crate::store::{Store, StoreError};

#[derive(Debug, Default)]
struct State {
    items: HashMap<ItemId, Item>,
    events: Vec<QuantityEvent>,
    audit: Vec<AuditEntry>,
    users: HashMap<UserId, UserAccount>,
    next_item_id: i64,
    next_event_id: i64,
    next_audit_id: i64,
    next_user_id: i64,
}

impl State {
    fn sku_taken(&self, sku: &str, except: Option<ItemId>) -> bool {
        self.items
            .values()
            .any(|item| Some(item.id) != except && item.sku == sku)
    }

    fn commit_audit(&mut self, draft: AuditDraft, at: DateTime<Utc>) -> AuditEntry {
        self.next_audit_id += 1;
        let entry = AuditEntry {
            id: AuditId::new(self.next_audit_id),
            entity: draft.entity,
            entity_id: draft.entity_id,
            action: draft.action,
            before: draft.before,
            after: draft.after,
            note: draft.note,
            actor: draft.actor,
            recorded_at: at,
        };
        self.audit.push(entry.clone());
        entry
    }

    /// Chain check plus commit of one ledger row.
    fn commit_event(
        &mut self,
        stored_quantity: i64,
        draft: EventDraft,
    ) -> Result<QuantityEvent, StoreError> {
        if draft.quantity_before != stored_quantity {
            return Err(StoreError::ChainViolation(format!(
                "item {}: row starts at {}, store has {}",
                draft.item_id, draft.quantity_before, stored_quantity
            )));
        }
        if draft.quantity_before + draft.quantity_delta != draft.quantity_after {
            return Err(StoreError::ChainViolation(format!(
                "item {}: row arithmetic is inconsistent",
                draft.item_id
            )));
        }

        self.next_event_id += 1;
        let event = QuantityEvent {
            id: EventId::new(self.next_event_id),
            item_id: draft.item_id,
            kind: draft.kind,
            quantity_before: draft.quantity_before,
            quantity_delta: draft.quantity_delta,
            quantity_after: draft.quantity_after,
            note: draft.note,
            actor: draft.actor,
            recorded_at: draft.recorded_at,
        };
        self.events.push(event.clone());
        Ok(event)
    }
}

/// In-memory store.
///
/// Intended for tests/dev. One lock over the whole state keeps every commit
/// a true unit of work; a SQL backend would use a transaction instead.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn create_item(&self, mut item: Item, mut audit: AuditDraft) -> Result<Item, StoreError> {
        let mut state = self.write()?;

        if state.sku_taken(&item.sku, None) {
            return Err(StoreError::Conflict(format!(
                "sku '{}' already exists",
                item.sku
            )));
        }

        state.next_item_id += 1;
        item.id = ItemId::new(state.next_item_id);

        // The caller snapshotted the item before the id existed.
        audit.entity_id = Some(item.id.raw());
        if let Some(after) = audit.after.as_mut().and_then(|v| v.as_object_mut()) {
            after.insert("id".to_string(), serde_json::json!(item.id.raw()));
        }
        state.commit_audit(audit, Utc::now());
        state.items.insert(item.id, item.clone());

        Ok(item)
    }

    fn persist_item(
        &self,
        item: Item,
        event: Option<EventDraft>,
        audit: AuditDraft,
    ) -> Result<(Item, Option<QuantityEvent>), StoreError> {
        let mut state = self.write()?;

        let stored = state
            .items
            .get(&item.id)
            .ok_or_else(|| StoreError::NotFound(format!("item {}", item.id)))?
            .clone();

        if item.sku != stored.sku && state.sku_taken(&item.sku, Some(item.id)) {
            return Err(StoreError::Conflict(format!(
                "sku '{}' already exists",
                item.sku
            )));
        }

        // Validate everything before touching state; a failed commit must
        // leave no partial writes behind.
        let committed_event = match event {
            Some(draft) => {
                if draft.item_id != item.id {
                    return Err(StoreError::ChainViolation(format!(
                        "row targets item {}, commit is for item {}",
                        draft.item_id, item.id
                    )));
                }
                if draft.quantity_after != item.quantity {
                    return Err(StoreError::ChainViolation(format!(
                        "item {}: row ends at {}, item carries {}",
                        item.id, draft.quantity_after, item.quantity
                    )));
                }
                Some(state.commit_event(stored.quantity, draft)?)
            }
            None => {
                if item.quantity != stored.quantity {
                    return Err(StoreError::ChainViolation(format!(
                        "item {}: quantity changed without a ledger row",
                        item.id
                    )));
                }
                None
            }
        };

        state.commit_audit(audit, Utc::now());
        state.items.insert(item.id, item.clone());

        Ok((item, committed_event))
    }

    fn persist_bulk(&self, batch: Vec<(Item, AuditDraft)>) -> Result<Vec<Item>, StoreError> {
        let mut state = self.write()?;

        for (item, _) in &batch {
            let stored = state
                .items
                .get(&item.id)
                .ok_or_else(|| StoreError::NotFound(format!("item {}", item.id)))?;
            if item.quantity != stored.quantity {
                return Err(StoreError::ChainViolation(format!(
                    "item {}: quantity changed without a ledger row",
                    item.id
                )));
            }
        }

        let now = Utc::now();
        let mut committed = Vec::with_capacity(batch.len());
        for (item, audit) in batch {
            state.commit_audit(audit, now);
            state.items.insert(item.id, item.clone());
            committed.push(item);
        }

        Ok(committed)
    }

    fn item(&self, id: ItemId) -> Result<Item, StoreError> {
        self.read()?
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    fn item_by_sku(&self, sku: &str) -> Option<Item> {
        self.read()
            .ok()?
            .items
            .values()
            .find(|item| item.sku == sku)
            .cloned()
    }

    fn items_snapshot(&self) -> Vec<Item> {
        let Ok(state) = self.read() else {
            return Vec::new();
        };
        let mut items: Vec<Item> = state.items.values().cloned().collect();
        items.sort_by_key(|item| item.id);
        items
    }

    fn events_since(
        &self,
        item_id: Option<ItemId>,
        since: Option<DateTime<Utc>>,
    ) -> Vec<QuantityEvent> {
        let Ok(state) = self.read() else {
            return Vec::new();
        };
        state
            .events
            .iter()
            .filter(|event| item_id.is_none_or(|id| event.item_id == id))
            .filter(|event| since.is_none_or(|cutoff| event.recorded_at >= cutoff))
            .cloned()
            .collect()
    }

    fn record_audit(&self, draft: AuditDraft) -> Result<AuditEntry, StoreError> {
        let mut state = self.write()?;
        Ok(state.commit_audit(draft, Utc::now()))
    }

    fn recent_audit(&self, limit: usize) -> Vec<AuditEntry> {
        let Ok(state) = self.read() else {
            return Vec::new();
        };
        state
            .audit
            .iter()
            .rev()
            .take(limit.min(MAX_RECENT))
            .cloned()
            .collect()
    }

    fn create_user(&self, mut user: UserAccount) -> Result<UserAccount, StoreError> {
        let mut state = self.write()?;

        if state
            .users
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        state.next_user_id += 1;
        user.id = UserId::new(state.next_user_id);
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    fn persist_user(
        &self,
        user: UserAccount,
        audit: Option<AuditDraft>,
    ) -> Result<UserAccount, StoreError> {
        let mut state = self.write()?;

        if !state.users.contains_key(&user.id) {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }

        if let Some(draft) = audit {
            state.commit_audit(draft, Utc::now());
        }
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    fn user(&self, id: UserId) -> Result<UserAccount, StoreError> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    fn user_by_api_key(&self, api_key: &str) -> Option<UserAccount> {
        self.read()
            .ok()?
            .users
            .values()
            .find(|user| user.api_key == api_key)
            .cloned()
    }

    fn users_snapshot(&self) -> Vec<UserAccount> {
        let Ok(state) = self.read() else {
            return Vec::new();
        };
        let mut users: Vec<UserAccount> = state.users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        users
    }
}
