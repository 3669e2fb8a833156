//! # NoteMarket Server
//!
//! HTTP API for the NoteMarket study-document marketplace.
//!
//! - **Catalog**: filtered, sorted listings with facets and active-filter chips
//! - **Preview**: page-gated previews with signed links to truncated copies
//! - **Selling**: upload, edit and delete PDFs with grade proof checks
//! - **Accounts**: profiles created on first access, full account deletion
//!
//! Bearer tokens are HS256 JWTs from the hosted identity provider.

pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// The full application: versioned API plus body limit, CORS and tracing.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().body_limit();
    let cors = cors_layer(&state.config().cors.allowed_origins);

    routes::create_api_router(state.clone())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let allow_methods = AllowMethods::list([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]);
    let allow_headers: Vec<HeaderName> = vec![header::AUTHORIZATION, header::CONTENT_TYPE];

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(allow_methods)
        .allow_headers(AllowHeaders::list(allow_headers))
}
