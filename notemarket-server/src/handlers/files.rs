use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use notemarket_model::PDF_CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;

use crate::AppState;
use crate::infra::errors::AppResult;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub signature: String,
}

/// Serve a stored object behind a signed link.
pub async fn serve_signed_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<SignedQuery>,
) -> AppResult<Response> {
    if let Err(err) = state
        .signer
        .verify(&path, query.expires, &query.signature, Utc::now())
    {
        debug!(path = %path, error = %err, "rejected signed link");
        return Err(err.into());
    }

    let bytes = state.marketplace().storage().download(&path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static("private, max-age=300")),
        ],
        bytes,
    )
        .into_response())
}
