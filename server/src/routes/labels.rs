//! Label list endpoint

use axum::{extract::State, Json};

use crate::state::SharedState;

/// GET /labels - Class labels in model output order
pub async fn list_labels(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.labels.clone())
}
