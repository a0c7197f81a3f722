//! Reorder suggestion engine.
//!
//! Deterministic model:
//! - Candidates: non-deleted items at/below their reorder threshold whose
//!   status is not `discontinued`.
//! - Ranking: ascending depletion ratio `quantity / max(threshold, 1)` (most
//!   depleted first), ties by ascending quantity, then SKU order so the
//!   ranking is total and reproducible.
//! - `recommended_order_qty = max(threshold * 2 - quantity, threshold)`:
//!   restore double the threshold, never order less than one threshold.
//!
//! The advisor may replace the `reason` strings, nothing else.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use stockline_ledger::{Item, ItemStatus};

use crate::advisor::AdvisorPrompt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    pub sku: String,
    pub name: String,
    pub current_quantity: i64,
    pub reorder_threshold: i64,
    pub recommended_order_qty: i64,
    pub reason: String,
}

fn recommended_qty(quantity: i64, threshold: i64) -> i64 {
    (threshold * 2 - quantity).max(threshold)
}

fn reason_for(item: &Item) -> String {
    format!(
        "Quantity {} is at or below the reorder threshold {}.",
        item.quantity, item.reorder_threshold
    )
}

/// Rank restock candidates from an item snapshot. Pure and idempotent.
pub fn rank(snapshot: &[Item], limit: usize) -> Vec<ReorderSuggestion> {
    let mut candidates: Vec<&Item> = snapshot
        .iter()
        .filter(|item| {
            !item.is_deleted
                && item.status != ItemStatus::Discontinued
                && item.quantity <= item.reorder_threshold
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.depletion_ratio()
            .total_cmp(&b.depletion_ratio())
            .then_with(|| a.quantity.cmp(&b.quantity))
            .then_with(|| a.sku.cmp(&b.sku))
    });

    candidates
        .into_iter()
        .take(limit)
        .map(|item| ReorderSuggestion {
            sku: item.sku.clone(),
            name: item.name.clone(),
            current_quantity: item.quantity,
            reorder_threshold: item.reorder_threshold,
            recommended_order_qty: recommended_qty(item.quantity, item.reorder_threshold),
            reason: reason_for(item),
        })
        .collect()
}

/// Build the enrichment prompt, or `None` when there is nothing to ask.
pub fn prompt(suggestions: &[ReorderSuggestion]) -> Option<AdvisorPrompt> {
    if suggestions.is_empty() {
        return None;
    }

    let payload: Vec<JsonValue> = suggestions
        .iter()
        .map(|s| {
            json!({
                "sku": s.sku,
                "name": s.name,
                "current_quantity": s.current_quantity,
                "reorder_threshold": s.reorder_threshold,
                "recommended_order_qty": s.recommended_order_qty,
            })
        })
        .collect();

    Some(AdvisorPrompt::new(
        "You are an inventory analyst. Return strict JSON with this shape: \
         {\"reasons\": {\"<sku>\": \"short explanation\"}}",
        format!(
            "Provide a concise reorder reason per item: {}",
            JsonValue::Array(payload)
        ),
    ))
}

/// Validate an advisor response and splice its reasons into the ranking.
///
/// Accepted shape: `{"reasons": {sku: non-empty string}}`. The ranking,
/// quantities and membership are untouched; SKUs the advisor skipped keep
/// their deterministic reason. Anything else rejects the whole response.
pub fn enrich(base: &Vec<ReorderSuggestion>, value: &JsonValue) -> Option<Vec<ReorderSuggestion>> {
    let reasons = value.get("reasons")?.as_object()?;

    let mut enriched = base.clone();
    for suggestion in &mut enriched {
        if let Some(candidate) = reasons.get(&suggestion.sku) {
            let text = candidate.as_str()?.trim();
            if !text.is_empty() {
                suggestion.reason = text.to_string();
            }
        }
    }

    Some(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use stockline_ledger::ItemDraft;

    fn item(sku: &str, quantity: i64, threshold: i64) -> Item {
        Item::from_draft(
            ItemDraft {
                sku: sku.into(),
                name: format!("{sku} name"),
                category: "misc".into(),
                details: None,
                quantity,
                reorder_threshold: threshold,
                unit_cost: 1.0,
                status: None,
            },
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn ranks_most_depleted_first() {
        // A: 2/10 = 0.2, B: 8/10 = 0.8 -> A first; A ordered 18 units.
        let snapshot = vec![item("B", 8, 10), item("A", 2, 10)];
        let ranked = rank(&snapshot, 20);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].sku, "A");
        assert_eq!(ranked[0].recommended_order_qty, 18);
        assert_eq!(ranked[1].sku, "B");
        assert_eq!(ranked[1].recommended_order_qty, 12);
    }

    #[test]
    fn recommendation_never_below_one_threshold() {
        // quantity == threshold: 2t - q == t exactly; deeper stock never dips below t.
        let ranked = rank(&[item("A", 10, 10)], 20);
        assert_eq!(ranked[0].recommended_order_qty, 10);
    }

    #[test]
    fn skips_discontinued_deleted_and_healthy_items() {
        let mut discontinued = item("D", 1, 10);
        discontinued.status = ItemStatus::Discontinued;
        let mut deleted = item("X", 1, 10);
        deleted.is_deleted = true;
        let healthy = item("H", 50, 10);

        let ranked = rank(&[discontinued, deleted, healthy, item("A", 3, 10)], 20);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].sku, "A");
    }

    #[test]
    fn tie_breaks_by_quantity_then_sku() {
        // Same ratio (0.5): quantities 5/10 and 10/20 -> lower quantity first.
        let snapshot = vec![item("Z", 10, 20), item("M", 5, 10), item("A", 5, 10)];
        let ranked = rank(&snapshot, 20);
        assert_eq!(
            ranked.iter().map(|s| s.sku.as_str()).collect::<Vec<_>>(),
            vec!["A", "M", "Z"]
        );
    }

    #[test]
    fn identical_snapshot_yields_identical_ranking() {
        let snapshot = vec![item("B", 8, 10), item("A", 2, 10), item("C", 4, 12)];
        assert_eq!(rank(&snapshot, 20), rank(&snapshot, 20));
    }

    #[test]
    fn enrich_replaces_reason_only() {
        let base = rank(&[item("A", 2, 10)], 20);
        let enriched = enrich(&base, &json!({"reasons": {"A": "Velocity is up."}})).unwrap();
        assert_eq!(enriched[0].reason, "Velocity is up.");
        assert_eq!(enriched[0].recommended_order_qty, base[0].recommended_order_qty);
    }

    #[test]
    fn enrich_rejects_non_string_reasons() {
        let base = rank(&[item("A", 2, 10)], 20);
        assert!(enrich(&base, &json!({"reasons": {"A": 42}})).is_none());
        assert!(enrich(&base, &json!({"notes": {}})).is_none());
    }

    #[test]
    fn empty_candidate_list_sends_no_prompt() {
        assert!(prompt(&[]).is_none());
    }
}
