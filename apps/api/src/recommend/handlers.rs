use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::OwnerId;
use crate::errors::AppError;
use crate::recommend::{build_prompt, prompts, Recommendations};
use crate::sections::store as section_store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub document_id: Uuid,
    pub job_description: String,
}

/// POST /api/v1/recommendations
pub async fn handle_recommend(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<Recommendations>, AppError> {
    let sections =
        section_store::list_by_document(&state.db, owner_id, Some(req.document_id), None).await?;

    let prompt = build_prompt(&req.job_description, &sections);
    let recommendations: Recommendations = state
        .llm
        .call_json(&prompt, prompts::RECOMMEND_SYSTEM)
        .await
        .map_err(|e| AppError::Upstream(format!("recommendation call failed: {e}")))?;

    Ok(Json(recommendations))
}
