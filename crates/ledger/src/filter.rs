//! Snapshot filtering, sorting and pagination.
//!
//! One pure implementation serves both the standard search/list path and the
//! natural-language path, so the two can never drift apart.

use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemStatus};

/// Partial item filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Free-text token matched (case-insensitively) against name, SKU,
    /// category and details.
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<ItemStatus>,
    pub min_qty: Option<i64>,
    pub max_qty: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if !self.include_deleted && item.is_deleted {
            return false;
        }

        if let Some(q) = self.q.as_deref() {
            let token = q.trim().to_lowercase();
            if !token.is_empty() {
                let hit = item.name.to_lowercase().contains(&token)
                    || item.sku.to_lowercase().contains(&token)
                    || item.category.to_lowercase().contains(&token)
                    || item
                        .details
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&token));
                if !hit {
                    return false;
                }
            }
        }

        if let Some(category) = self.category.as_deref() {
            if !item.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }

        if let Some(min) = self.min_qty {
            if item.quantity < min {
                return false;
            }
        }

        if let Some(max) = self.max_qty {
            if item.quantity > max {
                return false;
            }
        }

        true
    }
}

/// Sortable item fields.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Sku,
    Name,
    Category,
    Quantity,
    Status,
    #[default]
    UpdatedAt,
    CreatedAt,
}

impl SortField {
    /// Lenient parse; unknown values fall back to the default sort.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "sku" => SortField::Sku,
            "name" => SortField::Name,
            "category" => SortField::Category,
            "quantity" => SortField::Quantity,
            "status" => SortField::Status,
            "created_at" => SortField::CreatedAt,
            _ => SortField::UpdatedAt,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn parse_or_default(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortDir::Asc
        } else {
            SortDir::Desc
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<Item>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

fn compare(a: &Item, b: &Item, field: SortField) -> core::cmp::Ordering {
    match field {
        SortField::Sku => a.sku.cmp(&b.sku),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Category => a.category.cmp(&b.category),
        SortField::Quantity => a.quantity.cmp(&b.quantity),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
    // Stable tie-break so identical snapshots paginate identically.
    .then_with(|| a.id.cmp(&b.id))
}

/// Filter, sort and paginate an item snapshot.
///
/// `page` is 1-based; `page_size` of zero yields an empty page with the
/// correct total.
pub fn search(
    snapshot: &[Item],
    filter: &ItemFilter,
    sort_by: SortField,
    sort_dir: SortDir,
    page: usize,
    page_size: usize,
) -> SearchPage {
    let mut hits: Vec<Item> = snapshot
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect();

    hits.sort_by(|a, b| {
        let ord = compare(a, b, sort_by);
        match sort_dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });

    let total = hits.len();
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    SearchPage {
        items: hits[start..end].to_vec(),
        total,
        page,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;
    use chrono::Utc;

    fn item(id: i64, sku: &str, category: &str, quantity: i64, status: Option<ItemStatus>) -> Item {
        let mut item = Item::from_draft(
            ItemDraft {
                sku: sku.into(),
                name: format!("{sku} name"),
                category: category.into(),
                details: Some("shelf A".into()),
                quantity,
                reorder_threshold: 10,
                unit_cost: 1.0,
                status,
            },
            None,
            Utc::now(),
        )
        .unwrap();
        item.id = stockline_core::ItemId::new(id);
        item
    }

    fn snapshot() -> Vec<Item> {
        vec![
            item(1, "A-1", "hardware", 50, None),
            item(2, "B-2", "hardware", 4, None),
            item(3, "C-3", "office", 80, None),
            item(4, "D-4", "office", 2, Some(ItemStatus::Discontinued)),
        ]
    }

    #[test]
    fn deleted_items_excluded_by_default() {
        let page = search(&snapshot(), &ItemFilter::default(), SortField::Sku, SortDir::Asc, 1, 50);
        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|i| !i.is_deleted));
    }

    #[test]
    fn quantity_bounds_and_category() {
        let filter = ItemFilter {
            category: Some("Hardware".into()),
            max_qty: Some(10),
            ..Default::default()
        };
        let page = search(&snapshot(), &filter, SortField::UpdatedAt, SortDir::Desc, 1, 50);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].sku, "B-2");
    }

    #[test]
    fn free_text_matches_details() {
        let filter = ItemFilter {
            q: Some("shelf".into()),
            ..Default::default()
        };
        let page = search(&snapshot(), &filter, SortField::Sku, SortDir::Asc, 1, 50);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn status_filter_finds_low_stock() {
        let filter = ItemFilter {
            status: Some(ItemStatus::LowStock),
            ..Default::default()
        };
        let page = search(&snapshot(), &filter, SortField::Sku, SortDir::Asc, 1, 50);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].sku, "B-2");
    }

    #[test]
    fn pagination_is_stable() {
        let snapshot = snapshot();
        let all = search(&snapshot, &ItemFilter::default(), SortField::Quantity, SortDir::Asc, 1, 50);
        let p1 = search(&snapshot, &ItemFilter::default(), SortField::Quantity, SortDir::Asc, 1, 2);
        let p2 = search(&snapshot, &ItemFilter::default(), SortField::Quantity, SortDir::Asc, 2, 2);
        assert_eq!(p1.total, 3);
        let mut joined = p1.items;
        joined.extend(p2.items);
        assert_eq!(joined, all.items);
    }
}
