use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use notemarket_core::{
    CatalogView, Identity,
    api_types::{ApiResponse, DocumentDetails, PreviewResponse},
    upload::DocumentForm,
};
use notemarket_model::{Document, DocumentId, PDF_CONTENT_TYPE};
use serde::Deserialize;

use super::catalog_query::{parse_limit, parse_selection};
use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

/// Sell form plus the PDF, base64 encoded. A `data:` URL prefix is accepted.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(flatten)]
    pub form: DocumentForm,
    pub file_base64: String,
}

/// Edit form; the file is only replaced when `file_base64` is present.
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    #[serde(flatten)]
    pub form: DocumentForm,
    #[serde(default)]
    pub file_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<ApiResponse<CatalogView>>> {
    let selection = parse_selection(&pairs)?;
    let limit = parse_limit(&pairs)?;
    let mut view = state.marketplace().list_catalog(selection).await?;
    if let Some(limit) = limit {
        view.documents.truncate(limit);
    }
    Ok(Json(ApiResponse::success(view)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> AppResult<Json<ApiResponse<DocumentDetails>>> {
    let document = state.marketplace().get_document(id).await?;
    Ok(Json(ApiResponse::success(document.into())))
}

pub async fn preview_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
    Query(query): Query<PreviewQuery>,
    viewer: Option<Extension<Identity>>,
) -> AppResult<Json<ApiResponse<PreviewResponse>>> {
    let viewer = viewer.map(|Extension(identity)| identity);
    let preview = state
        .marketplace()
        .preview(id, viewer.as_ref(), query.page)
        .await?;
    Ok(Json(ApiResponse::success(preview)))
}

pub async fn download_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<DocumentId>,
) -> AppResult<Response> {
    let file = state.marketplace().download(&identity, id).await?;
    let disposition = content_disposition(&file.filename)?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

pub async fn upload_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Document>>)> {
    let Json(request) = payload?;
    let bytes = decode_file(&request.file_base64)?;
    let document = state
        .marketplace()
        .upload(&identity, &request.form, bytes)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(document).with_message("Dokumentet er publisert".into())),
    ))
}

pub async fn update_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<DocumentId>,
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Document>>> {
    let Json(request) = payload?;
    let replacement = request.file_base64.as_deref().map(decode_file).transpose()?;
    let document = state
        .marketplace()
        .update(&identity, id, &request.form, replacement)
        .await?;
    Ok(Json(ApiResponse::success(document)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<DocumentId>,
) -> AppResult<StatusCode> {
    state.marketplace().delete_document(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn decode_file(encoded: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::bad_request("file_base64 is not valid base64"))
}

/// `attachment` with an ASCII fallback name and the UTF-8 name in `filename*`.
fn content_disposition(filename: &str) -> Result<HeaderValue, AppError> {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
        .collect();
    let encoded: String = url::form_urlencoded::byte_serialize(filename.as_bytes()).collect();
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}"
    ))
    .map_err(|_| AppError::internal("Failed to build download headers"))
}
