//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `seed.rs`: demo accounts and inventory for the dev binary

use axum::{routing::get, Extension, Router};

use stockline_store::InventoryService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod seed;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(service: InventoryService) -> Router {
    let auth_state = middleware::AuthState {
        service: service.clone(),
    };

    // Everything under /api requires a resolved principal.
    let protected = Router::new()
        .nest("/api", routes::router())
        .layer(Extension(service))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
