use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use notemarket_core::Identity;

use crate::AppState;
use crate::infra::errors::AppError;

/// Rejects the request unless it carries a bearer token for a live account.
/// The resolved [`Identity`] is placed in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;
    let identity = resolve(&state, &token)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Like [`auth_middleware`] but lets anonymous requests through.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(&request) {
        match resolve(&state, &token).await {
            Ok(Some(identity)) => {
                request.extensions_mut().insert(identity);
            }
            Ok(None) => {}
            Err(err) => return err.into_response(),
        }
    }

    next.run(request).await
}

async fn resolve(state: &AppState, token: &str) -> Result<Option<Identity>, AppError> {
    Ok(state
        .marketplace()
        .identity_provider()
        .current_user(token)
        .await?)
}

pub fn extract_bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
