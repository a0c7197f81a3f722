use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use stockline_auth::Principal;
use stockline_store::InventoryService;

#[derive(Clone)]
pub struct AuthState {
    pub service: InventoryService,
}

/// Resolve `X-API-Key` to a [`Principal`] request extension.
///
/// Keys belong to active accounts only; a missing header, unknown key or
/// deactivated account all read the same from outside.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let api_key = extract_api_key(req.headers())?;

    let user = state
        .service
        .authenticate(api_key)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(Principal::from(&user));

    Ok(next.run(req).await)
}

fn extract_api_key(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get("x-api-key")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let key = header
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .trim();
    if key.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(key)
}
