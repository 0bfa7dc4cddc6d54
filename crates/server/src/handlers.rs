use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forehead_core::pipeline::locate_forehead_use_case::ForeheadOutcome;
use forehead_core::shared::constants::NO_FACE_MESSAGE;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::{ApiError, ErrorBody};

#[derive(Debug, Default, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// `POST /detect-forehead`
///
/// A missing face answers 200 with an error body; clients depend on that.
pub async fn detect_forehead(
    State(state): State<AppState>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let encoded = request
        .image_base64
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingImage)?;
    log::debug!("Received payload of {} base64 chars", encoded.len());

    let locator = state.locator.clone();
    let outcome = tokio::task::spawn_blocking(move || locator.execute_base64(&encoded))
        .await
        .map_err(|e| ApiError::Internal(format!("detection task failed: {e}")))??;

    match outcome {
        ForeheadOutcome::Detected(tip) => Ok(Json(tip).into_response()),
        ForeheadOutcome::NoFaceFound => Ok(Json(ErrorBody::new(NO_FACE_MESSAGE)).into_response()),
        ForeheadOutcome::InvalidInput(_) => Err(ApiError::MalformedPayload),
    }
}
