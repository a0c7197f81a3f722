use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use stockline_audit::{item_snapshot, user_snapshot, AuditAction, AuditDraft, AuditEntry};
use stockline_auth::{Role, UserAccount};
use stockline_core::{DomainError, DomainResult, ItemId, UserId};
use stockline_engines::{
    anomaly, intent, reorder, AnomalyAlert, AnomalyParams, Decision, FallbackCoordinator,
    QueryIntent, ReorderSuggestion,
};
use stockline_ledger::{
    apply_event, replay, search, EventKind, Item, ItemDraft, ItemFilter, ItemStatus,
    QuantityEvent, SearchPage, SortDir, SortField,
};

use crate::store::Store;

/// How many audit entries the dashboard shows.
const DASHBOARD_ACTIVITY: usize = 12;

/// Partial item update. Absent fields are left untouched; a quantity change
/// is turned into an adjustment ledger row rather than written directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub details: Option<String>,
    pub quantity: Option<i64>,
    pub reorder_threshold: Option<i64>,
    pub unit_cost: Option<f64>,
    pub status: Option<ItemStatus>,
}

/// Aggregated dashboard figures. Counts other than `total_items` cover the
/// non-deleted set only.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_items: usize,
    pub active_items: usize,
    pub low_stock_alerts: usize,
    pub total_quantity: i64,
    pub total_inventory_value: f64,
    pub items_by_category: BTreeMap<String, usize>,
    pub recent_activity: Vec<AuditEntry>,
}

/// The application service: every mutation and every read the outer layers
/// use goes through here.
///
/// Role enforcement happens upstream; methods take the acting user id only
/// for attribution (ledger rows, audit entries, `updated_by`).
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn Store>,
    coordinator: FallbackCoordinator,
}

impl InventoryService {
    pub fn new(store: Arc<dyn Store>, coordinator: FallbackCoordinator) -> Self {
        Self { store, coordinator }
    }

    // ----- items -----

    pub fn create_item(&self, actor: Option<UserId>, draft: ItemDraft) -> DomainResult<Item> {
        let item = Item::from_draft(draft, actor, Utc::now())?;

        let audit = AuditDraft::item(0, AuditAction::ItemCreate)
            .with_after(item_snapshot(&item))
            .by(actor);
        let created = self.store.create_item(item, audit)?;

        info!(item_id = created.id.raw(), sku = %created.sku, "item created");
        Ok(created)
    }

    /// Fetch one item. Soft-deleted items read as absent.
    pub fn item(&self, id: ItemId) -> DomainResult<Item> {
        let item = self.store.item(id)?;
        if item.is_deleted {
            return Err(DomainError::not_found(format!("item {id}")));
        }
        Ok(item)
    }

    pub fn update_item(
        &self,
        actor: Option<UserId>,
        id: ItemId,
        patch: ItemPatch,
    ) -> DomainResult<Item> {
        let current = self.item(id)?;
        let before = item_snapshot(&current);
        let now = Utc::now();

        let mut updated = current.clone();
        if let Some(sku) = patch.sku {
            let sku = sku.trim().to_string();
            if sku.is_empty() {
                return Err(DomainError::validation("sku must not be empty"));
            }
            updated.sku = sku;
        }
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("name must not be empty"));
            }
            updated.name = name;
        }
        if let Some(category) = patch.category {
            let category = category.trim().to_string();
            if category.is_empty() {
                return Err(DomainError::validation("category must not be empty"));
            }
            updated.category = category;
        }
        if let Some(details) = patch.details {
            updated.details = Some(details);
        }
        if let Some(threshold) = patch.reorder_threshold {
            if threshold < 0 {
                return Err(DomainError::validation(
                    "reorder_threshold must not be negative",
                ));
            }
            updated.reorder_threshold = threshold;
        }
        if let Some(unit_cost) = patch.unit_cost {
            if !unit_cost.is_finite() || unit_cost < 0.0 {
                return Err(DomainError::validation("unit_cost must not be negative"));
            }
            updated.unit_cost = unit_cost;
        }

        // A quantity edit is a ledger event, never a direct write.
        let mut event = None;
        if let Some(target) = patch.quantity {
            let delta = target - updated.quantity;
            if delta != 0 {
                let (stepped, row) = apply_event(
                    &updated,
                    EventKind::Adjustment,
                    delta,
                    Some("Quantity changed through item update".to_string()),
                    actor,
                    now,
                )?;
                updated = stepped;
                event = Some(row);
            }
        }

        if let Some(status) = patch.status {
            // Explicit status wins over the projection.
            updated.status = status;
            updated.is_deleted = status == ItemStatus::Discontinued;
        } else if event.is_none() {
            // Threshold edits can move the item across the low-stock line.
            updated.status = updated.project_status(true);
        }

        updated.updated_by = actor;
        updated.updated_at = now;

        let audit = AuditDraft::item(id.raw(), AuditAction::ItemUpdate)
            .with_before(before)
            .with_after(item_snapshot(&updated))
            .by(actor);
        let (item, _) = self.store.persist_item(updated, event, audit)?;

        Ok(item)
    }

    /// Soft delete: the item stays in storage for ledger and audit history
    /// but disappears from reads and is closed to further events.
    pub fn delete_item(&self, actor: Option<UserId>, id: ItemId) -> DomainResult<Item> {
        let current = self.item(id)?;
        let before = item_snapshot(&current);

        let mut updated = current;
        updated.is_deleted = true;
        updated.status = ItemStatus::Discontinued;
        updated.updated_by = actor;
        updated.updated_at = Utc::now();

        let audit = AuditDraft::item(id.raw(), AuditAction::ItemDelete)
            .with_before(before)
            .with_after(item_snapshot(&updated))
            .by(actor);
        let (item, _) = self.store.persist_item(updated, None, audit)?;

        info!(item_id = id.raw(), sku = %item.sku, "item deleted");
        Ok(item)
    }

    /// Manually pin an item's status. `Ordered` and `Discontinued` pins
    /// survive later quantity events per the projection rules.
    ///
    /// This is also the restoration path: soft-deleted items are reachable
    /// here, and any non-discontinued status clears the deleted flag.
    pub fn set_status(
        &self,
        actor: Option<UserId>,
        id: ItemId,
        status: ItemStatus,
    ) -> DomainResult<Item> {
        let current = self.store.item(id)?;
        let before = item_snapshot(&current);

        let mut updated = current;
        updated.status = status;
        updated.is_deleted = status == ItemStatus::Discontinued;
        updated.updated_by = actor;
        updated.updated_at = Utc::now();

        let audit = AuditDraft::item(id.raw(), AuditAction::ItemStatusUpdate)
            .with_before(before)
            .with_after(item_snapshot(&updated))
            .by(actor);
        let (item, _) = self.store.persist_item(updated, None, audit)?;

        Ok(item)
    }

    /// Set the same status on a set of items, all-or-nothing: one missing id
    /// fails the whole batch before anything is written. Like [`set_status`]
    /// this reaches soft-deleted items, so it can restore in bulk.
    ///
    /// [`set_status`]: InventoryService::set_status
    pub fn bulk_set_status(
        &self,
        actor: Option<UserId>,
        ids: &[ItemId],
        status: ItemStatus,
    ) -> DomainResult<Vec<Item>> {
        let now = Utc::now();

        let mut seen = Vec::new();
        let mut batch = Vec::new();
        for &id in ids {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);

            let current = self.store.item(id)?;
            let before = item_snapshot(&current);

            let mut updated = current;
            updated.status = status;
            updated.is_deleted = status == ItemStatus::Discontinued;
            updated.updated_by = actor;
            updated.updated_at = now;

            let audit = AuditDraft::item(id.raw(), AuditAction::ItemStatusBulkUpdate)
                .with_before(before)
                .with_after(item_snapshot(&updated))
                .by(actor);
            batch.push((updated, audit));
        }

        let items = self.store.persist_bulk(batch)?;
        info!(count = items.len(), status = %status, "bulk status update");
        Ok(items)
    }

    /// Record an inbound/outbound/adjustment event against an item.
    pub fn adjust_quantity(
        &self,
        actor: Option<UserId>,
        id: ItemId,
        kind: EventKind,
        delta: i64,
        note: Option<String>,
    ) -> DomainResult<(Item, QuantityEvent)> {
        let current = self.item(id)?;
        let before = item_snapshot(&current);

        let (updated, row) = apply_event(&current, kind, delta, note, actor, Utc::now())?;

        let audit = AuditDraft::item(id.raw(), AuditAction::ItemQuantityAdjust)
            .with_before(before)
            .with_after(item_snapshot(&updated))
            .with_note(format!("{kind} {:+}", row.quantity_delta))
            .by(actor);
        let (item, event) = self.store.persist_item(updated, Some(row), audit)?;
        let event = event
            .ok_or_else(|| DomainError::conflict("ledger row was not committed"))?;

        Ok((item, event))
    }

    /// Full ledger history for one item, oldest first.
    pub fn item_events(&self, id: ItemId) -> DomainResult<Vec<QuantityEvent>> {
        self.store.item(id)?;
        Ok(self.store.events_since(Some(id), None))
    }

    /// Replay an item's ledger and verify it reconstructs the stored
    /// quantity. Returns the replayed quantity.
    pub fn verify_item_ledger(&self, id: ItemId) -> DomainResult<i64> {
        let item = self.store.item(id)?;
        let events = self.store.events_since(Some(id), None);

        let replayed = replay(&events)?;
        if !events.is_empty() && replayed != item.quantity {
            return Err(DomainError::conflict(format!(
                "item {id}: ledger replays to {replayed}, store has {}",
                item.quantity
            )));
        }

        Ok(replayed)
    }

    // ----- reads -----

    pub fn search(
        &self,
        filter: &ItemFilter,
        sort_by: SortField,
        sort_dir: SortDir,
        page: usize,
        page_size: usize,
    ) -> SearchPage {
        let snapshot = self.store.items_snapshot();
        search(&snapshot, filter, sort_by, sort_dir, page, page_size)
    }

    pub fn dashboard(&self) -> DashboardSummary {
        let snapshot = self.store.items_snapshot();
        let active: Vec<&Item> = snapshot.iter().filter(|item| !item.is_deleted).collect();

        let mut items_by_category = BTreeMap::new();
        for item in &active {
            *items_by_category.entry(item.category.clone()).or_insert(0) += 1;
        }

        let value: f64 = active
            .iter()
            .map(|item| item.quantity as f64 * item.unit_cost)
            .sum();

        DashboardSummary {
            total_items: snapshot.len(),
            active_items: active.len(),
            // Anything needing attention: flagged, awaiting an order, or
            // sitting at/under its threshold.
            low_stock_alerts: active
                .iter()
                .filter(|item| {
                    matches!(item.status, ItemStatus::LowStock | ItemStatus::Ordered)
                        || item.quantity <= item.reorder_threshold
                })
                .count(),
            total_quantity: active.iter().map(|item| item.quantity).sum(),
            total_inventory_value: (value * 100.0).round() / 100.0,
            items_by_category,
            recent_activity: self.store.recent_audit(DASHBOARD_ACTIVITY),
        }
    }

    pub fn recent_audit(&self, limit: usize) -> Vec<AuditEntry> {
        self.store.recent_audit(limit)
    }

    // ----- users -----

    pub fn users(&self) -> Vec<UserAccount> {
        self.store.users_snapshot()
    }

    pub fn authenticate(&self, api_key: &str) -> Option<UserAccount> {
        self.store
            .user_by_api_key(api_key)
            .filter(|user| user.is_active)
    }

    pub fn create_user(
        &self,
        username: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
    ) -> DomainResult<UserAccount> {
        let user = UserAccount::new(username, full_name, role, Utc::now())?;
        Ok(self.store.create_user(user)?)
    }

    /// Seeding variant with a caller-chosen API key instead of a random one.
    pub fn create_user_with_key(
        &self,
        username: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
        api_key: impl Into<String>,
    ) -> DomainResult<UserAccount> {
        let user = UserAccount::new(username, full_name, role, Utc::now())?.with_api_key(api_key);
        Ok(self.store.create_user(user)?)
    }

    pub fn set_user_role(
        &self,
        actor: Option<UserId>,
        id: UserId,
        role: Role,
    ) -> DomainResult<UserAccount> {
        let current = self.store.user(id)?;
        let before = user_snapshot(&current);

        let updated = current.with_role(role, Utc::now());
        let audit = AuditDraft::user(id.raw(), AuditAction::UserRoleUpdate)
            .with_before(before)
            .with_after(user_snapshot(&updated))
            .by(actor);
        let user = self.store.persist_user(updated, Some(audit))?;

        info!(user_id = id.raw(), role = %role, "user role updated");
        Ok(user)
    }

    // ----- decision engines -----

    pub fn advisor_online(&self) -> bool {
        self.coordinator.is_online()
    }

    /// Reorder suggestions for items at or under their threshold, most
    /// depleted first.
    pub async fn reorder_suggestions(&self, limit: usize) -> Decision<Vec<ReorderSuggestion>> {
        let snapshot = self.store.items_snapshot();
        let fallback = reorder::rank(&snapshot, limit);
        let prompt = reorder::prompt(&fallback);
        self.coordinator
            .resolve("reorder", prompt, fallback, reorder::enrich)
            .await
    }

    /// Anomalous quantity movements over the trailing `days` window.
    pub async fn anomaly_alerts(&self, days: i64, limit: usize) -> Decision<Vec<AnomalyAlert>> {
        let cutoff = Utc::now() - Duration::days(days);
        let events = self.store.events_since(None, Some(cutoff));
        let snapshot = self.store.items_snapshot();

        let fallback = anomaly::detect(&events, &snapshot, &AnomalyParams::default(), limit);
        let prompt = anomaly::prompt(&fallback);
        self.coordinator
            .resolve("anomaly", prompt, fallback, anomaly::enrich)
            .await
    }

    /// Parse a natural-language query into the filter vocabulary and run the
    /// resulting search. The parsed intent is returned with its provenance.
    pub async fn natural_search(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> (Decision<QueryIntent>, SearchPage) {
        let snapshot = self.store.items_snapshot();
        let mut categories: Vec<String> = snapshot
            .iter()
            .filter(|item| !item.is_deleted)
            .map(|item| item.category.clone())
            .collect();
        categories.sort();
        categories.dedup();

        let fallback = intent::parse_fallback(query, &categories);
        let prompt = intent::prompt(query, &categories);
        let decision = self
            .coordinator
            .resolve("query_intent", prompt, fallback, |_, value| {
                intent::validate(value)
            })
            .await;

        let filter = decision.payload().clone().into_filter();
        let results = search(
            &snapshot,
            &filter,
            SortField::default(),
            SortDir::default(),
            page,
            page_size,
        );

        (decision, results)
    }
}
