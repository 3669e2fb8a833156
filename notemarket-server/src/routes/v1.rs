use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    auth::{auth_middleware, optional_auth_middleware},
    handlers::{documents, files, me, statistics},
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(statistics::health))
        .route("/statistics", get(statistics::get_statistics))
        .route("/files/{*path}", get(files::serve_signed_file))
        .merge(create_public_routes(state.clone()))
        .merge(create_protected_routes(state))
}

/// Catalog routes; a valid token marks the caller as a possible owner.
fn create_public_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/documents", get(documents::list_documents))
        .route("/documents/{id}", get(documents::get_document))
        .route("/documents/{id}/preview", get(documents::preview_document))
        .layer(middleware::from_fn_with_state(state, optional_auth_middleware))
}

/// Create protected routes that require authentication
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/documents", post(documents::upload_document))
        .route(
            "/documents/{id}",
            axum::routing::put(documents::update_document).delete(documents::delete_document),
        )
        .route("/documents/{id}/download", get(documents::download_document))
        .route("/me", delete(me::delete_account))
        .route("/me/documents", get(me::my_documents))
        .route("/me/profile", get(me::get_profile).put(me::update_profile))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}
