//! Integration tests for the full write/read pipeline:
//! service → store → ledger/audit, plus the decision engines end to end.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use stockline_audit::AuditAction;
use stockline_auth::Role;
use stockline_core::{DomainError, ItemId};
use stockline_engines::coordinator::DEFAULT_BUDGET;
use stockline_engines::{
    Advisor, AdvisorError, AdvisorPrompt, Decision, FallbackCoordinator,
};
use stockline_ledger::{EventKind, ItemDraft, ItemFilter, ItemStatus, SortDir, SortField};

use crate::memory::MemoryStore;
use crate::service::{InventoryService, ItemPatch};

struct CannedAdvisor {
    reply: JsonValue,
}

#[async_trait]
impl Advisor for CannedAdvisor {
    fn model(&self) -> &str {
        "canned-model"
    }

    async fn complete(&self, _prompt: &AdvisorPrompt) -> Result<JsonValue, AdvisorError> {
        Ok(self.reply.clone())
    }
}

fn offline_service() -> InventoryService {
    InventoryService::new(Arc::new(MemoryStore::new()), FallbackCoordinator::offline())
}

fn service_with_reply(reply: JsonValue) -> InventoryService {
    let coordinator =
        FallbackCoordinator::new(Arc::new(CannedAdvisor { reply }), DEFAULT_BUDGET);
    InventoryService::new(Arc::new(MemoryStore::new()), coordinator)
}

fn draft(sku: &str, quantity: i64, threshold: i64) -> ItemDraft {
    ItemDraft {
        sku: sku.to_string(),
        name: format!("{sku} widget"),
        category: "hardware".into(),
        details: None,
        quantity,
        reorder_threshold: threshold,
        unit_cost: 3.0,
        status: None,
    }
}

#[test]
fn create_adjust_and_replay() {
    let service = offline_service();
    let admin = service
        .create_user("admin", "Admin", Role::Admin)
        .unwrap();
    let actor = Some(admin.id);

    let item = service.create_item(actor, draft("SKU-1", 20, 10)).unwrap();
    assert_eq!(item.status, ItemStatus::InStock);

    let (item, event) = service
        .adjust_quantity(actor, item.id, EventKind::Outbound, 15, None)
        .unwrap();
    assert_eq!(item.quantity, 5);
    assert_eq!(item.status, ItemStatus::LowStock);
    assert_eq!(event.quantity_delta, -15);
    assert_eq!(event.actor, Some(admin.id));

    // Over-draw is rejected and leaves the ledger untouched.
    let err = service
        .adjust_quantity(actor, item.id, EventKind::Outbound, 10, None)
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition(_)));
    assert_eq!(service.item_events(item.id).unwrap().len(), 1);

    assert_eq!(service.verify_item_ledger(item.id).unwrap(), 5);
}

#[test]
fn quantity_edit_through_update_is_a_ledger_event() {
    let service = offline_service();
    let item = service.create_item(None, draft("SKU-1", 8, 3)).unwrap();

    let patch = ItemPatch {
        name: Some("Renamed widget".into()),
        quantity: Some(2),
        ..Default::default()
    };
    let updated = service.update_item(None, item.id, patch).unwrap();
    assert_eq!(updated.name, "Renamed widget");
    assert_eq!(updated.quantity, 2);
    assert_eq!(updated.status, ItemStatus::LowStock);

    let events = service.item_events(item.id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Adjustment);
    assert_eq!(events[0].quantity_delta, -6);
    assert_eq!(
        events[0].note.as_deref(),
        Some("Quantity changed through item update")
    );
}

#[test]
fn deleted_items_vanish_from_reads_and_reject_events() {
    let service = offline_service();
    let item = service.create_item(None, draft("SKU-1", 5, 2)).unwrap();
    service.delete_item(None, item.id).unwrap();

    assert!(matches!(
        service.item(item.id).unwrap_err(),
        DomainError::NotFound(_)
    ));
    assert!(matches!(
        service
            .adjust_quantity(None, item.id, EventKind::Inbound, 3, None)
            .unwrap_err(),
        DomainError::NotFound(_)
    ));

    let page = service.search(
        &ItemFilter::default(),
        SortField::default(),
        SortDir::default(),
        1,
        50,
    );
    assert_eq!(page.total, 0);
}

#[test]
fn deleted_item_is_restorable_through_status_update() {
    let service = offline_service();
    let item = service.create_item(None, draft("SKU-1", 20, 5)).unwrap();
    service.delete_item(None, item.id).unwrap();
    assert!(service.item(item.id).is_err());

    // A non-discontinued status brings the item back.
    let restored = service
        .set_status(None, item.id, ItemStatus::InStock)
        .unwrap();
    assert!(!restored.is_deleted);
    assert_eq!(restored.status, ItemStatus::InStock);

    let back = service.item(item.id).unwrap();
    assert_eq!(back.quantity, 20);

    let page = service.search(
        &ItemFilter::default(),
        SortField::default(),
        SortDir::default(),
        1,
        50,
    );
    assert_eq!(page.total, 1);

    // And the ledger accepts events again.
    service
        .adjust_quantity(None, item.id, EventKind::Outbound, 3, None)
        .unwrap();
}

#[test]
fn bulk_restore_clears_the_deleted_flag() {
    let service = offline_service();
    let a = service.create_item(None, draft("SKU-A", 5, 2)).unwrap();
    let b = service.create_item(None, draft("SKU-B", 5, 2)).unwrap();
    service.delete_item(None, a.id).unwrap();
    service.delete_item(None, b.id).unwrap();

    let items = service
        .bulk_set_status(None, &[a.id, b.id], ItemStatus::InStock)
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| !i.is_deleted));
}

#[test]
fn bulk_status_is_all_or_nothing() {
    let service = offline_service();
    let a = service.create_item(None, draft("SKU-A", 5, 2)).unwrap();
    let b = service.create_item(None, draft("SKU-B", 5, 2)).unwrap();

    let err = service
        .bulk_set_status(None, &[a.id, b.id, ItemId::new(999)], ItemStatus::Ordered)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(service.item(a.id).unwrap().status, ItemStatus::InStock);

    let items = service
        .bulk_set_status(None, &[a.id, b.id], ItemStatus::Ordered)
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.status == ItemStatus::Ordered));
}

#[test]
fn sku_rename_onto_existing_sku_conflicts() {
    let service = offline_service();
    service.create_item(None, draft("SKU-A", 5, 2)).unwrap();
    let b = service.create_item(None, draft("SKU-B", 5, 2)).unwrap();

    let err = service
        .update_item(
            None,
            b.id,
            ItemPatch {
                sku: Some("SKU-A".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[test]
fn audit_trail_records_every_mutation_newest_first() {
    let service = offline_service();
    let item = service.create_item(None, draft("SKU-1", 10, 3)).unwrap();
    service
        .adjust_quantity(None, item.id, EventKind::Inbound, 5, None)
        .unwrap();
    service
        .set_status(None, item.id, ItemStatus::Ordered)
        .unwrap();
    service.delete_item(None, item.id).unwrap();

    let trail = service.recent_audit(50);
    let actions: Vec<_> = trail.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::ItemDelete,
            AuditAction::ItemStatusUpdate,
            AuditAction::ItemQuantityAdjust,
            AuditAction::ItemCreate,
        ]
    );

    // The creation entry was stamped with the assigned id, snapshot included.
    let create = trail.last().unwrap();
    assert_eq!(create.entity_id, Some(item.id.raw()));
    assert_eq!(create.after.as_ref().unwrap()["id"], json!(item.id.raw()));
    assert!(create.before.is_none());
}

#[test]
fn dashboard_aggregates_active_items_only() {
    let service = offline_service();
    service.create_item(None, draft("SKU-A", 10, 3)).unwrap();
    let mut low = draft("SKU-B", 2, 5);
    low.category = "office".into();
    service.create_item(None, low).unwrap();
    let gone = service.create_item(None, draft("SKU-C", 7, 3)).unwrap();
    service.delete_item(None, gone.id).unwrap();

    let summary = service.dashboard();
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.active_items, 2);
    assert_eq!(summary.low_stock_alerts, 1);
    assert_eq!(summary.total_quantity, 12);
    assert_eq!(summary.total_inventory_value, 36.0);
    assert_eq!(summary.items_by_category["hardware"], 1);
    assert_eq!(summary.items_by_category["office"], 1);
    assert!(!summary.recent_activity.is_empty());
}

#[test]
fn role_change_is_audited() {
    let service = offline_service();
    let admin = service.create_user("admin", "Admin", Role::Admin).unwrap();
    let viewer = service
        .create_user("viewer", "Viewer", Role::Viewer)
        .unwrap();

    let updated = service
        .set_user_role(Some(admin.id), viewer.id, Role::Manager)
        .unwrap();
    assert_eq!(updated.role, Role::Manager);

    let trail = service.recent_audit(5);
    assert_eq!(trail[0].action, AuditAction::UserRoleUpdate);
    assert_eq!(trail[0].actor, Some(admin.id));
    // Snapshots never leak API keys.
    assert!(trail[0].after.as_ref().unwrap().get("api_key").is_none());
}

#[test]
fn authenticate_requires_active_account() {
    let service = offline_service();
    let user = service.create_user("ops", "Ops", Role::Manager).unwrap();

    let found = service.authenticate(&user.api_key).unwrap();
    assert_eq!(found.id, user.id);
    assert!(service.authenticate("bogus-key").is_none());
}

#[tokio::test]
async fn engines_fall_back_without_an_advisor() {
    let service = offline_service();
    service.create_item(None, draft("SKU-A", 2, 10)).unwrap();
    service.create_item(None, draft("SKU-B", 50, 10)).unwrap();

    let decision = service.reorder_suggestions(5).await;
    let Decision::Fallback { payload } = decision else {
        panic!("expected fallback");
    };
    assert_eq!(payload.len(), 1);
    assert_eq!(payload[0].sku, "SKU-A");
    assert_eq!(payload[0].recommended_order_qty, 18);

    let alerts = service.anomaly_alerts(30, 10).await;
    assert!(matches!(alerts, Decision::Fallback { .. }));
}

#[tokio::test]
async fn natural_search_fallback_drives_the_shared_filter() {
    let service = offline_service();
    service.create_item(None, draft("SKU-A", 2, 10)).unwrap();
    service.create_item(None, draft("SKU-B", 50, 10)).unwrap();

    let (decision, page) = service.natural_search("low stock under 10", 1, 50).await;
    let Decision::Fallback { payload } = decision else {
        panic!("expected fallback");
    };
    assert_eq!(payload.status, Some(ItemStatus::LowStock));
    assert_eq!(payload.max_qty, Some(10));
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].sku, "SKU-A");
}

#[tokio::test]
async fn advisor_reasons_are_applied_when_the_schema_holds() {
    let service = service_with_reply(json!({
        "reasons": {"SKU-A": "Two days of cover left at current velocity."}
    }));
    service.create_item(None, draft("SKU-A", 2, 10)).unwrap();

    let decision = service.reorder_suggestions(5).await;
    let Decision::Ai { model, payload } = decision else {
        panic!("expected ai decision");
    };
    assert_eq!(model, "canned-model");
    assert_eq!(
        payload[0].reason,
        "Two days of cover left at current velocity."
    );
}

#[tokio::test]
async fn malformed_advisor_intent_degrades_to_fallback() {
    // "sort_by" is outside the filter vocabulary, so the parse is rejected.
    let service = service_with_reply(json!({"status": "low_stock", "sort_by": "name"}));
    service.create_item(None, draft("SKU-A", 2, 10)).unwrap();

    let (decision, _) = service.natural_search("low stock", 1, 50).await;
    assert!(matches!(decision, Decision::Fallback { .. }));
}
