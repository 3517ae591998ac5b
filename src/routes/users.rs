use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::{
    EmailQuery, InsertResult, NewUser, RegistrationAction, RegistrationMessage, User, UserRole,
};
use crate::AppState;

/// Register a user unless the configured policy says the email is taken
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(user): Json<NewUser>,
) -> AppResult<Response> {
    user.validate()?;
    let email = user.email.trim();

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ? LIMIT 1")
        .bind(email)
        .fetch_optional(state.db.pool())
        .await?;

    let policy = state.config.users.registration_policy;
    match RegistrationAction::decide(policy, existing.is_some()) {
        RegistrationAction::AlreadyExists => {
            Ok(Json(RegistrationMessage::ALREADY_EXISTS).into_response())
        }
        RegistrationAction::Insert => {
            let id = uuid::Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO users (id, email, name, photo_url, role, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(email)
            .bind(&user.name)
            .bind(&user.photo_url)
            .bind(String::from(UserRole::Student))
            .bind(Utc::now())
            .execute(state.db.pool())
            .await?;

            tracing::info!("Registered user {} ({:?} policy)", email, policy);

            Ok(Json(InsertResult::new(id)).into_response())
        }
    }
}

/// Look a user up by email
pub async fn show(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<User>> {
    let email = query.require()?;

    let user: User =
        sqlx::query_as("SELECT * FROM users WHERE email = ? ORDER BY created_at ASC LIMIT 1")
            .bind(email)
            .fetch_optional(state.db.pool())
            .await?
            .ok_or(AppError::UserNotFound)?;

    Ok(Json(user))
}
