//! Demo data for the dev binary: three accounts with well-known API keys
//! and a small inventory with some movement history.

use stockline_auth::Role;
use stockline_core::DomainResult;
use stockline_ledger::{EventKind, ItemDraft, ItemStatus};
use stockline_store::InventoryService;

pub fn seed_demo(service: &InventoryService) -> DomainResult<()> {
    let admin = service.create_user_with_key("admin", "Admin User", Role::Admin, "admin-demo-key")?;
    let manager =
        service.create_user_with_key("manager", "Manager User", Role::Manager, "manager-demo-key")?;
    service.create_user_with_key("viewer", "Viewer User", Role::Viewer, "viewer-demo-key")?;

    let actor = Some(manager.id);

    let drafts = [
        item("ELEC-1001", "27-inch Monitor", "Electronics", "QHD IPS office monitor", 42, 15, 179.00, None),
        item("ELEC-1002", "Wireless Keyboard", "Electronics", "Low-profile Bluetooth keyboard", 17, 12, 39.50, None),
        item("ELEC-1003", "USB-C Dock", "Electronics", "Dual-display docking station", 6, 10, 121.90, Some(ItemStatus::Ordered)),
        item("OFF-2001", "Notebook Pack", "Office Supplies", "Pack of 5 ruled notebooks", 120, 40, 6.20, None),
        item("OFF-2002", "Ballpoint Pen Box", "Office Supplies", "Box of 50 blue pens", 22, 30, 12.70, None),
        item("OFF-2003", "Printer Toner C13", "Office Supplies", "Laser toner cartridge C13", 4, 8, 88.40, Some(ItemStatus::Ordered)),
        item("SAFE-3001", "Safety Gloves", "Safety", "Cut-resistant gloves (pair)", 85, 35, 3.60, None),
        item("SAFE-3002", "Protective Goggles", "Safety", "Anti-fog protective eyewear", 25, 20, 8.90, None),
        item("PKG-4001", "Cardboard Carton", "Packaging", "Medium corrugated box", 260, 100, 0.95, None),
        item("PKG-4002", "Shipping Tape", "Packaging", "48mm transparent tape roll", 28, 25, 1.80, None),
    ];

    let mut ids = std::collections::HashMap::new();
    for draft in drafts {
        let sku = draft.sku.clone();
        let created = service.create_item(actor, draft)?;
        ids.insert(sku, created.id);
    }

    // Recent movements for the anomaly and activity panels.
    let movements = [
        ("ELEC-1002", EventKind::Outbound, -8, "Bulk laptop onboarding"),
        ("SAFE-3002", EventKind::Outbound, -11, "Site safety inspection issue"),
        ("PKG-4002", EventKind::Outbound, -10, "Large outbound shipment"),
        ("OFF-2003", EventKind::Inbound, 20, "Urgent toner replenishment"),
    ];
    for (sku, kind, delta, note) in movements {
        if let Some(&id) = ids.get(sku) {
            service.adjust_quantity(actor, id, kind, delta, Some(note.to_string()))?;
        }
    }

    // One retired item so deleted-item filtering shows up in demos.
    service.create_item(
        Some(admin.id),
        item(
            "LEG-9001",
            "Legacy Barcode Scanner",
            "Electronics",
            "Legacy device retired from catalog",
            0,
            0,
            95.00,
            Some(ItemStatus::Discontinued),
        ),
    )?;

    tracing::info!("demo seed complete (keys: admin-demo-key, manager-demo-key, viewer-demo-key)");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn item(
    sku: &str,
    name: &str,
    category: &str,
    details: &str,
    quantity: i64,
    reorder_threshold: i64,
    unit_cost: f64,
    status: Option<ItemStatus>,
) -> ItemDraft {
    ItemDraft {
        sku: sku.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        details: Some(details.to_string()),
        quantity,
        reorder_threshold,
        unit_cost,
        status,
    }
}
