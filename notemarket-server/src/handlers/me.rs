use axum::{Extension, Json, extract::State};
use notemarket_core::{
    Identity,
    api_types::{AccountDeletion, ApiResponse},
};
use notemarket_model::{Document, Profile, ProfileUpdate};

use crate::AppState;
use crate::infra::errors::AppResult;

pub async fn my_documents(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<ApiResponse<Vec<Document>>>> {
    let documents = state.marketplace().my_documents(&identity).await?;
    Ok(Json(ApiResponse::success(documents)))
}

/// The caller's profile, created on first access.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = state.marketplace().ensure_profile(&identity).await?;
    Ok(Json(ApiResponse::success(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = state
        .marketplace()
        .update_profile(&identity, &update)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<ApiResponse<AccountDeletion>>> {
    let outcome = state.marketplace().delete_account(&identity).await?;
    Ok(Json(
        ApiResponse::success(outcome).with_message("Kontoen er slettet".into()),
    ))
}
