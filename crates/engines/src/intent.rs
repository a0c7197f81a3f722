//! Natural-language query intent parser.
//!
//! Converts a free-text search into the partial filter vocabulary
//! `{q, category, status, min_qty, max_qty}`. The fallback extractor is
//! regex/keyword based; the advisor may propose a full parse, but its
//! response is validated field-by-field against this same vocabulary and
//! rejected wholesale on any deviation.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockline_ledger::{ItemFilter, ItemStatus};

use crate::advisor::AdvisorPrompt;

/// Parsed query intent: the closed filter vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<ItemStatus>,
    pub min_qty: Option<i64>,
    pub max_qty: Option<i64>,
}

impl QueryIntent {
    /// Feed the shared item search (deleted items always excluded here).
    pub fn into_filter(self) -> ItemFilter {
        ItemFilter {
            q: self.q,
            category: self.category,
            status: self.status,
            min_qty: self.min_qty,
            max_qty: self.max_qty,
            include_deleted: false,
        }
    }
}

fn category_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)category\s*[:=]\s*([a-z0-9][a-z0-9\- ]*)").unwrap())
}

fn under_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:under|below|less than|at most)\s+(\d+)").unwrap())
}

fn over_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:over|above|more than|at least)\s+(\d+)").unwrap())
}

/// Status vocabulary, matched on word boundaries so "low" never fires
/// inside "below" and "out" never fires inside "about" or "outbound".
fn status_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(discontinued|ordered|in stock|low|out)\b").unwrap())
}

fn status_for(keyword: &str) -> ItemStatus {
    match keyword {
        "discontinued" => ItemStatus::Discontinued,
        "ordered" => ItemStatus::Ordered,
        "in stock" => ItemStatus::InStock,
        // "low" and "out" both read as running low.
        _ => ItemStatus::LowStock,
    }
}

/// Deterministic keyword/regex extraction.
///
/// `categories` is the known category vocabulary from the item set; a
/// category mentioned anywhere in the query wins over none, an explicit
/// `category: x` prefix wins over both.
pub fn parse_fallback(query: &str, categories: &[String]) -> QueryIntent {
    let normalized = query.trim();
    let lowered = normalized.to_lowercase();

    let mut intent = QueryIntent::default();

    if let Some(captures) = category_pattern().captures(normalized) {
        intent.category = Some(captures[1].trim().to_string());
    } else {
        intent.category = categories
            .iter()
            .find(|c| !c.trim().is_empty() && lowered.contains(&c.trim().to_lowercase()))
            .map(|c| c.trim().to_string());
    }

    if let Some(captures) = status_pattern().captures(&lowered) {
        intent.status = Some(status_for(&captures[1]));
    }

    if let Some(captures) = under_pattern().captures(&lowered) {
        intent.max_qty = captures[1].parse().ok();
    }
    if let Some(captures) = over_pattern().captures(&lowered) {
        intent.min_qty = captures[1].parse().ok();
    }

    // Keep the raw text as a free-text token only when nothing structured
    // was recognized; otherwise phrases like "low stock under 10" would be
    // matched literally against item names and exclude everything.
    if intent == QueryIntent::default() && !normalized.is_empty() {
        intent.q = Some(normalized.to_string());
    }

    intent
}

const ALLOWED_FIELDS: &[&str] = &["q", "category", "status", "min_qty", "max_qty"];

/// Validate an advisor parse against the filter vocabulary.
///
/// Rejections (returning `None`): any field outside the vocabulary, a
/// non-string `q`/`category`, a `status` outside the four canonical values,
/// or a negative/non-integer quantity bound. `null` fields are treated as
/// absent.
pub fn validate(value: &JsonValue) -> Option<QueryIntent> {
    let object = value.as_object()?;

    if object.keys().any(|k| !ALLOWED_FIELDS.contains(&k.as_str())) {
        return None;
    }

    let mut intent = QueryIntent::default();

    for (key, field) in object {
        if field.is_null() {
            continue;
        }
        match key.as_str() {
            "q" => intent.q = Some(field.as_str()?.to_string()),
            "category" => intent.category = Some(field.as_str()?.to_string()),
            "status" => intent.status = Some(field.as_str()?.parse().ok()?),
            "min_qty" => {
                let n = field.as_i64()?;
                if n < 0 {
                    return None;
                }
                intent.min_qty = Some(n);
            }
            "max_qty" => {
                let n = field.as_i64()?;
                if n < 0 {
                    return None;
                }
                intent.max_qty = Some(n);
            }
            _ => unreachable!("vocabulary checked above"),
        }
    }

    Some(intent)
}

/// Build the parse prompt for the advisor.
pub fn prompt(query: &str, categories: &[String]) -> Option<AdvisorPrompt> {
    let normalized = query.trim();
    if normalized.is_empty() {
        return None;
    }

    Some(AdvisorPrompt::new(
        format!(
            "Parse an inventory search query. Return strict JSON with only the keys \
             q, category, status, min_qty, max_qty. status must be one of in_stock, \
             low_stock, ordered, discontinued. Known categories: {}.",
            categories.join(", ")
        ),
        normalized.to_string(),
    ))
}
