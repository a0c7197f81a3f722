use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use stockline_auth::Principal;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn me(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": principal.user_id,
        "username": principal.username,
        "role": principal.role,
    }))
}
