use std::sync::Arc;

use axum::{extract::State, Json};

use crate::error::{AppError, AppResult};
use crate::models::Instructor;
use crate::AppState;

/// Instructor directory
pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Instructor>>> {
    let instructors: Vec<Instructor> =
        sqlx::query_as("SELECT * FROM instructors ORDER BY name ASC")
            .fetch_all(state.db.pool())
            .await?;

    if instructors.is_empty() {
        return Err(AppError::NoInstructors);
    }

    Ok(Json(instructors))
}
