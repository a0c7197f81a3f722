use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use stockline_auth::Principal;
use stockline_core::UserId;
use stockline_store::InventoryService;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id/role", patch(update_role))
}

pub async fn list_users(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if !principal.role.can_administer_users() {
        return errors::forbidden(principal.role);
    }

    let users: Vec<_> = service.users().iter().map(dto::user_to_json).collect();
    Json(users).into_response()
}

pub async fn update_role(
    Extension(service): Extension<InventoryService>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(body): Json<dto::RoleUpdateRequest>,
) -> axum::response::Response {
    if !principal.role.can_administer_users() {
        return errors::forbidden(principal.role);
    }

    match service.set_user_role(Some(principal.user_id), UserId::new(id), body.role) {
        Ok(user) => Json(dto::user_to_json(&user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
