use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use stockline_auth::Principal;
use stockline_core::ItemId;
use stockline_ledger::{SortDir, SortField};
use stockline_store::{InventoryService, ItemPatch};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/search", get(search_items))
        .route("/status/bulk", patch(bulk_update_status))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/status", patch(update_status))
        .route("/:id/quantity", post(adjust_quantity))
}

pub async fn create_item(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    if !principal.role.can_write_inventory() {
        return errors::forbidden(principal.role);
    }

    match service.create_item(Some(principal.user_id), body.into_draft()) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(service): Extension<InventoryService>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    let (sort_by, sort_dir) = query.sort();
    let page = service.search(
        &query.filter(),
        sort_by,
        sort_dir,
        query.page(),
        query.page_size(),
    );
    Json(page).into_response()
}

/// Same as listing, but never includes deleted items and always sorts by
/// recency.
pub async fn search_items(
    Extension(service): Extension<InventoryService>,
    Query(mut query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    query.include_deleted = false;
    let page = service.search(
        &query.filter(),
        SortField::UpdatedAt,
        SortDir::Desc,
        query.page(),
        query.page_size(),
    );
    Json(page).into_response()
}

pub async fn get_item(
    Extension(service): Extension<InventoryService>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match service.item(ItemId::new(id)) {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(patch): Json<ItemPatch>,
) -> axum::response::Response {
    if !principal.role.can_write_inventory() {
        return errors::forbidden(principal.role);
    }

    match service.update_item(Some(principal.user_id), ItemId::new(id), patch) {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if !principal.role.can_write_inventory() {
        return errors::forbidden(principal.role);
    }

    match service.delete_item(Some(principal.user_id), ItemId::new(id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(body): Json<dto::ItemStatusUpdateRequest>,
) -> axum::response::Response {
    if !principal.role.can_write_inventory() {
        return errors::forbidden(principal.role);
    }

    match service.set_status(Some(principal.user_id), ItemId::new(id), body.status) {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn bulk_update_status(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::BulkStatusUpdateRequest>,
) -> axum::response::Response {
    if !principal.role.can_write_inventory() {
        return errors::forbidden(principal.role);
    }

    let ids: Vec<ItemId> = body.item_ids.iter().copied().map(ItemId::new).collect();
    match service.bulk_set_status(Some(principal.user_id), &ids, body.status) {
        Ok(items) => Json(serde_json::json!({
            "updated": items.len(),
            "items": items,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn adjust_quantity(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(body): Json<dto::QuantityAdjustmentRequest>,
) -> axum::response::Response {
    if !principal.role.can_write_inventory() {
        return errors::forbidden(principal.role);
    }

    match service.adjust_quantity(
        Some(principal.user_id),
        ItemId::new(id),
        body.event_type,
        body.quantity_delta,
        body.note,
    ) {
        Ok((item, event)) => Json(serde_json::json!({
            "item": item,
            "event": event,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
