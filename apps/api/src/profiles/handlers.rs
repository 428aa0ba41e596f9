use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::OwnerId;
use crate::errors::AppError;
use crate::profiles::models::{PersonalInfo, Profile};
use crate::profiles::store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub personal_info: PersonalInfo,
}

/// PUT /api/v1/profile — idempotent create.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = Profile::new(owner_id, req.personal_info);
    let stored = store::create_profile(&state.db, &profile).await?;
    Ok(Json(stored))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<Profile>, AppError> {
    store::get_profile(&state.db, owner_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = store::update_profile(&state.db, owner_id, req.personal_info).await?;
    Ok(Json(profile))
}
