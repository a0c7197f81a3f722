use axum::{routing::get, Router};

pub mod advisor;
pub mod audit;
pub mod dashboard;
pub mod items;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .route("/audit", get(audit::list_audit))
        .route("/dashboard", get(dashboard::summary))
        .nest("/items", items::router())
        .nest("/users", users::router())
        .nest("/ai", advisor::router())
}
