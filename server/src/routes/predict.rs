//! Prediction endpoint
//!
//! The body is parsed by hand rather than through the `Json` extractor so
//! every malformed request gets the same 400 body.

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use signlang::FEATURE_DIM;

use super::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Flattened landmarks: x, y, z for each of the 21 points
    pub landmarks: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
}

/// POST /predict - Classify one landmark vector
pub async fn predict(State(state): State<SharedState>, body: Bytes) -> Result<Json<PredictResponse>, ApiError> {
    let request: PredictRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Rejected body: {}", e);
        ApiError::InvalidInput
    })?;

    if request.landmarks.len() != FEATURE_DIM {
        tracing::debug!("Rejected body: {} values", request.landmarks.len());
        return Err(ApiError::InvalidInput);
    }
    let features: Vec<f32> = request.landmarks.iter().map(|&v| v as f32).collect();

    let prediction = tokio::task::spawn_blocking(move || {
        let predictor = state
            .predictor
            .lock()
            .map_err(|_| ApiError::Internal("predictor lock poisoned".to_string()))?;
        predictor.predict(&features).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("inference task failed: {}", e)))??;

    tracing::info!("Predicted {} ({:.3})", prediction.label, prediction.confidence);
    Ok(Json(PredictResponse {
        prediction: prediction.label,
    }))
}
