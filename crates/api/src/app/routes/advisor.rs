//! The three decision endpoints. The coordinator guarantees these always
//! answer; "the AI is down" is not an HTTP error here.

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockline_store::InventoryService;

use crate::app::dto;

pub fn router() -> Router {
    Router::new()
        .route("/reorder-suggestions", get(reorder_suggestions))
        .route("/anomaly-alerts", get(anomaly_alerts))
        .route("/natural-language-search", post(natural_language_search))
}

pub async fn reorder_suggestions(
    Extension(service): Extension<InventoryService>,
    Query(query): Query<dto::ReorderQuery>,
) -> axum::response::Response {
    let decision = service.reorder_suggestions(query.limit()).await;
    Json(dto::decision_envelope(&decision, "suggestions")).into_response()
}

pub async fn anomaly_alerts(
    Extension(service): Extension<InventoryService>,
    Query(query): Query<dto::AnomalyQuery>,
) -> axum::response::Response {
    let decision = service.anomaly_alerts(query.days(), query.limit()).await;
    Json(dto::decision_envelope(&decision, "alerts")).into_response()
}

pub async fn natural_language_search(
    Extension(service): Extension<InventoryService>,
    Json(body): Json<dto::NaturalLanguageSearchRequest>,
) -> axum::response::Response {
    let (decision, page) = service.natural_search(&body.query, 1, 100).await;

    Json(serde_json::json!({
        "source": decision.source(),
        "model": decision.model(),
        "parsed_filters": decision.payload(),
        "items": page.items,
        "total": page.total,
    }))
    .into_response()
}
