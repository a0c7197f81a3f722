use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    Json,
};

use stockline_store::InventoryService;

use crate::app::dto;

pub async fn list_audit(
    Extension(service): Extension<InventoryService>,
    Query(query): Query<dto::AuditQuery>,
) -> axum::response::Response {
    Json(service.recent_audit(query.limit())).into_response()
}
