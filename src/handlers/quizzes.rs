use axum::{extract::State, Json};

use crate::{error::Result, state::AppState};

/// Lists every quiz document as stored.
#[axum::debug_handler]
pub async fn list_quizzes(State(state): State<AppState>) -> Result<Json<Vec<sonic_rs::Value>>> {
    let quizzes = state.quizzes.list().await?;
    tracing::debug!("Listing {} quizzes", quizzes.len());
    Ok(Json(quizzes))
}

/// Liveness check.
pub async fn health() -> Json<sonic_rs::Value> {
    Json(sonic_rs::json!({ "status": "ok" }))
}
