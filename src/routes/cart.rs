use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::{CartItem, DeleteResult, EmailQuery, InsertResult, NewCartItem};
use crate::AppState;

/// Cart contents for one email
pub async fn show(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<Vec<CartItem>>> {
    // Reject before touching the store
    let email = query.require()?;

    let items: Vec<CartItem> =
        sqlx::query_as("SELECT * FROM carts WHERE email = ? ORDER BY created_at DESC")
            .bind(email)
            .fetch_all(state.db.pool())
            .await?;

    if items.is_empty() {
        return Err(AppError::CartEmpty);
    }

    Ok(Json(items))
}

/// Add item to cart
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(item): Json<NewCartItem>,
) -> AppResult<Json<InsertResult>> {
    item.validate()?;

    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO carts (id, email, course_id, name, image, price, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(item.email.trim())
    .bind(&item.course_id)
    .bind(&item.name)
    .bind(&item.image)
    .bind(item.price)
    .bind(Utc::now())
    .execute(state.db.pool())
    .await?;

    tracing::debug!("Cart item {} added for {}", id, item.email);

    Ok(Json(InsertResult::new(id)))
}

/// Remove item from cart; removing an absent item reports zero deletions
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let deleted = sqlx::query("DELETE FROM carts WHERE id = ?")
        .bind(&item_id)
        .execute(state.db.pool())
        .await?
        .rows_affected();

    Ok(Json(DeleteResult::new(deleted)))
}
