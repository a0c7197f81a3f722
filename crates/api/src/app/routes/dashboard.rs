use axum::{extract::Extension, response::IntoResponse, Json};

use stockline_store::InventoryService;

pub async fn summary(
    Extension(service): Extension<InventoryService>,
) -> axum::response::Response {
    Json(service.dashboard()).into_response()
}
