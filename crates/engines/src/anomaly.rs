//! Quantity movement anomaly engine.
//!
//! Two deterministic detection rules per item over the trailing window:
//! - **Statistical**: with at least [`AnomalyParams::min_samples`] events,
//!   flag any event whose `|delta|` exceeds `mean + sigma * stddev` of the
//!   item's `|delta|` distribution (sample stddev).
//! - **Absolute fraction**: regardless of history depth, flag an event whose
//!   `|delta|` exceeds a fixed fraction of the item's current quantity. This
//!   catches the low-history items the statistical rule must skip.
//!
//! The advisor may rewrite `explanation` and `suggested_action` for events
//! that are already flagged; it cannot flag or unflag.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use stockline_core::ItemId;
use stockline_ledger::{Item, QuantityEvent};

use crate::advisor::AdvisorPrompt;

/// Alert severity, bucketed by how far past the threshold the delta landed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    fn from_ratio(ratio: f64) -> Self {
        if ratio >= 2.5 {
            Severity::High
        } else if ratio >= 1.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAlert {
    pub sku: String,
    pub name: String,
    pub severity: Severity,
    pub quantity_delta: i64,
    pub explanation: String,
    pub suggested_action: String,
    pub occurred_at: DateTime<Utc>,
}

/// Detection tuning. Defaults match the documented rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyParams {
    /// Minimum events per item before the statistical rule applies.
    pub min_samples: usize,
    /// Stddev multiplier for the statistical threshold.
    pub sigma: f64,
    /// Fraction of current quantity for the absolute rule.
    pub quantity_fraction: f64,
}

impl Default for AnomalyParams {
    fn default() -> Self {
        Self {
            min_samples: 3,
            sigma: 2.0,
            quantity_fraction: 0.5,
        }
    }
}

const DEFAULT_ACTION: &str = "Review related orders and count inventory for this SKU.";

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Sample standard deviation (n-1), deterministic.
fn stddev_sample(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    var.sqrt()
}

/// The comparison basis that flagged an event (for the explanation text).
enum Basis {
    Statistical { mean: f64, stddev: f64 },
    Fraction { fraction: f64, quantity: i64 },
}

fn evaluate(
    event: &QuantityEvent,
    item: &Item,
    magnitudes: &[f64],
    params: &AnomalyParams,
) -> Option<(f64, Basis)> {
    let magnitude = event.quantity_delta.unsigned_abs() as f64;
    let mut best: Option<(f64, Basis)> = None;

    if magnitudes.len() >= params.min_samples {
        let m = mean(magnitudes);
        let s = stddev_sample(magnitudes, m);
        let threshold = m + params.sigma * s;
        if threshold > 0.0 && magnitude > threshold {
            best = Some((magnitude / threshold, Basis::Statistical { mean: m, stddev: s }));
        }
    }

    if item.quantity > 0 {
        let threshold = params.quantity_fraction * item.quantity as f64;
        if threshold > 0.0 && magnitude > threshold {
            let ratio = magnitude / threshold;
            // When both rules fire, the larger excess decides the severity.
            if best.as_ref().is_none_or(|(r, _)| ratio > *r) {
                best = Some((
                    ratio,
                    Basis::Fraction {
                        fraction: params.quantity_fraction,
                        quantity: item.quantity,
                    },
                ));
            }
        }
    }

    best
}

fn explanation_for(event: &QuantityEvent, basis: &Basis) -> String {
    match basis {
        Basis::Statistical { mean, stddev } => format!(
            "Unusually large {} movement ({:+}) against the recent baseline (mean {:.1}, stddev {:.1}).",
            event.kind, event.quantity_delta, mean, stddev
        ),
        Basis::Fraction { fraction, quantity } => format!(
            "Single {} movement ({:+}) exceeds {:.0}% of the current quantity ({}).",
            event.kind,
            event.quantity_delta,
            fraction * 100.0,
            quantity
        ),
    }
}

/// Flag anomalous quantity movements in a trailing event window.
///
/// `events` is the window (any order); `items` the current item snapshot.
/// Alerts come back newest-first, capped to `limit`. Pure and idempotent.
pub fn detect(
    events: &[QuantityEvent],
    items: &[Item],
    params: &AnomalyParams,
    limit: usize,
) -> Vec<AnomalyAlert> {
    let index: HashMap<ItemId, &Item> = items.iter().map(|item| (item.id, item)).collect();

    let mut magnitudes_by_item: HashMap<ItemId, Vec<f64>> = HashMap::new();
    for event in events {
        magnitudes_by_item
            .entry(event.item_id)
            .or_default()
            .push(event.quantity_delta.unsigned_abs() as f64);
    }

    let mut ordered: Vec<&QuantityEvent> = events.iter().collect();
    ordered.sort_by(|a, b| {
        b.recorded_at
            .cmp(&a.recorded_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut alerts = Vec::new();
    for event in ordered {
        if alerts.len() >= limit {
            break;
        }

        let Some(item) = index.get(&event.item_id) else {
            continue;
        };
        let magnitudes = &magnitudes_by_item[&event.item_id];

        if let Some((ratio, basis)) = evaluate(event, item, magnitudes, params) {
            alerts.push(AnomalyAlert {
                sku: item.sku.clone(),
                name: item.name.clone(),
                severity: Severity::from_ratio(ratio),
                quantity_delta: event.quantity_delta,
                explanation: explanation_for(event, &basis),
                suggested_action: DEFAULT_ACTION.to_string(),
                occurred_at: event.recorded_at,
            });
        }
    }

    alerts
}

/// Build the enrichment prompt, or `None` when nothing was flagged.
pub fn prompt(alerts: &[AnomalyAlert]) -> Option<AdvisorPrompt> {
    if alerts.is_empty() {
        return None;
    }

    let payload: Vec<JsonValue> = alerts
        .iter()
        .map(|a| {
            json!({
                "sku": a.sku,
                "name": a.name,
                "severity": a.severity,
                "quantity_delta": a.quantity_delta,
                "occurred_at": a.occurred_at,
            })
        })
        .collect();

    Some(AdvisorPrompt::new(
        "You are an inventory risk analyst. Return strict JSON: \
         {\"notes\": {\"<sku>\": {\"explanation\": \"...\", \"action\": \"...\"}}}",
        JsonValue::Array(payload).to_string(),
    ))
}

/// Validate an advisor response and splice its notes into the alerts.
///
/// Accepted shape: `{"notes": {sku: {"explanation"?: s, "action"?: s}}}`.
/// Membership and severity are untouched. A structurally wrong response
/// rejects entirely.
pub fn enrich(base: &Vec<AnomalyAlert>, value: &JsonValue) -> Option<Vec<AnomalyAlert>> {
    let notes = value.get("notes")?.as_object()?;

    let mut enriched = base.clone();
    for alert in &mut enriched {
        let Some(note) = notes.get(&alert.sku) else {
            continue;
        };
        let note = note.as_object()?;

        if let Some(explanation) = note.get("explanation") {
            let text = explanation.as_str()?.trim();
            if !text.is_empty() {
                alert.explanation = text.to_string();
            }
        }
        if let Some(action) = note.get("action") {
            let text = action.as_str()?.trim();
            if !text.is_empty() {
                alert.suggested_action = text.to_string();
            }
        }
    }

    Some(enriched)
}
