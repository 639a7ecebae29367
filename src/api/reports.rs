use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::ActionOutcome;
use crate::services::TakeActionRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/take-action", post(take_action))
}

#[derive(Debug, Serialize)]
pub struct TakeActionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

async fn take_action(
    State(state): State<AppState>,
    body: std::result::Result<Json<TakeActionRequest>, JsonRejection>,
) -> Result<Json<TakeActionResponse>> {
    // Body shape errors are validation errors, not axum's default 422.
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let outcome = state.moderation.take_action(&request).await?;

    Ok(Json(TakeActionResponse {
        success: true,
        outcome,
    }))
}
