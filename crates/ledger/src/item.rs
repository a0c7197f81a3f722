use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, ItemId, UserId};

/// Item lifecycle status.
///
/// `InStock` and `LowStock` are derived from quantity vs. threshold;
/// `Ordered` and `Discontinued` are manual pins that quantity changes never
/// auto-override.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InStock,
    LowStock,
    Ordered,
    Discontinued,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::InStock => "in_stock",
            ItemStatus::LowStock => "low_stock",
            ItemStatus::Ordered => "ordered",
            ItemStatus::Discontinued => "discontinued",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(ItemStatus::InStock),
            "low_stock" => Ok(ItemStatus::LowStock),
            "ordered" => Ok(ItemStatus::Ordered),
            "discontinued" => Ok(ItemStatus::Discontinued),
            other => Err(format!("unknown item status: {other}")),
        }
    }
}

/// An inventory item: the ledger's derived projection.
///
/// # Invariants
/// - `quantity` equals the running sum of all ledger deltas since creation
///   (the store checks the chain at commit time).
/// - `quantity >= 0`, `reorder_threshold >= 0`, `unit_cost >= 0`.
/// - Items are never hard-deleted; `is_deleted` is a soft flag and deleted
///   items keep their ledger and audit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub details: Option<String>,
    pub quantity: i64,
    pub reorder_threshold: i64,
    pub unit_cost: f64,
    pub status: ItemStatus,
    pub is_deleted: bool,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub details: Option<String>,
    pub quantity: i64,
    pub reorder_threshold: i64,
    pub unit_cost: f64,
    /// Explicit initial status; when absent the status is derived.
    pub status: Option<ItemStatus>,
}

impl ItemDraft {
    fn validate(&self) -> DomainResult<()> {
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.reorder_threshold < 0 {
            return Err(DomainError::validation("reorder threshold cannot be negative"));
        }
        if !(self.unit_cost.is_finite() && self.unit_cost >= 0.0) {
            return Err(DomainError::validation("unit cost must be a non-negative number"));
        }
        Ok(())
    }
}

impl Item {
    /// Materialize a draft into an item (id assigned later by the store).
    ///
    /// An explicit `Discontinued` status at creation also soft-deletes the
    /// item; without an explicit status the initial status is derived from
    /// quantity vs. threshold.
    pub fn from_draft(
        draft: ItemDraft,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;

        let mut item = Self {
            id: ItemId::new(0),
            sku: draft.sku.trim().to_string(),
            name: draft.name.trim().to_string(),
            category: draft.category.trim().to_string(),
            details: draft.details,
            quantity: draft.quantity,
            reorder_threshold: draft.reorder_threshold,
            unit_cost: draft.unit_cost,
            status: draft.status.unwrap_or(ItemStatus::InStock),
            is_deleted: draft.status == Some(ItemStatus::Discontinued),
            created_by: actor,
            updated_by: actor,
            created_at: now,
            updated_at: now,
        };

        if draft.status.is_none() {
            item.status = item.project_status(false);
        }

        Ok(item)
    }

    /// Derive the lifecycle status from quantity and threshold.
    ///
    /// `Discontinued` always sticks. With `keep_ordered`, a manual `Ordered`
    /// pin survives while quantity is still at or below the threshold; once
    /// quantity recovers above it the derived status takes over again. The
    /// reverse direction is deliberate: low-stock auto-transition only fires
    /// from `InStock`, so manual pins are never clobbered by the ledger.
    pub fn project_status(&self, keep_ordered: bool) -> ItemStatus {
        if self.status == ItemStatus::Discontinued {
            return ItemStatus::Discontinued;
        }

        if keep_ordered
            && self.status == ItemStatus::Ordered
            && self.quantity <= self.reorder_threshold
        {
            return ItemStatus::Ordered;
        }

        if self.quantity <= self.reorder_threshold {
            ItemStatus::LowStock
        } else {
            ItemStatus::InStock
        }
    }

    /// Depletion ratio used by the reorder ranking (lower = more depleted).
    pub fn depletion_ratio(&self) -> f64 {
        self.quantity as f64 / self.reorder_threshold.max(1) as f64
    }
}
