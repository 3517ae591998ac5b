use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use crate::error::{AppError, AppResult};
use crate::models::{
    Course, CourseFilter, CourseInput, CourseStatus, InsertResult, SetStatusQuery, UpdateResult,
};
use crate::AppState;

/// Approved courses for the public catalogue
pub async fn list_approved(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Course>>> {
    let courses: Vec<Course> =
        sqlx::query_as("SELECT * FROM classes WHERE status = ? ORDER BY created_at DESC")
            .bind(CourseStatus::Approved.as_str())
            .fetch_all(state.db.pool())
            .await?;

    if courses.is_empty() {
        return Err(AppError::NoCourses);
    }

    Ok(Json(courses))
}

/// Every course regardless of status (moderation view)
pub async fn list_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Course>>> {
    let courses: Vec<Course> = sqlx::query_as("SELECT * FROM classes ORDER BY created_at DESC")
        .fetch_all(state.db.pool())
        .await?;

    if courses.is_empty() {
        return Err(AppError::NoCourses);
    }

    Ok(Json(courses))
}

/// Courses matching every supplied filter; an empty match is not an error here
pub async fn filter(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<CourseFilter>,
) -> AppResult<Json<Vec<Course>>> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM classes WHERE 1 = 1");

    if let Some(ref email) = filter.email {
        query.push(" AND email = ").push_bind(email);
    }
    // Matched as stored; a value outside the known statuses finds nothing
    if let Some(ref status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(ref name) = filter.name {
        query.push(" AND name = ").push_bind(name);
    }
    if let Some(ref instructor_name) = filter.instructor_name {
        query
            .push(" AND instructor_name = ")
            .push_bind(instructor_name);
    }

    query.push(" ORDER BY created_at DESC");

    let courses: Vec<Course> = query
        .build_query_as()
        .fetch_all(state.db.pool())
        .await?;

    Ok(Json(courses))
}

/// Single course by id
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Course>> {
    let course: Course = sqlx::query_as("SELECT * FROM classes WHERE id = ?")
        .bind(&id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or(AppError::CourseNotFound)?;

    Ok(Json(course))
}

/// Create a course; new courses always wait for moderation
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CourseInput>,
) -> AppResult<Json<InsertResult>> {
    input.validate()?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO classes (id, name, email, instructor_name, image, available_seats, price, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(input.name.trim())
    .bind(input.email.trim())
    .bind(input.instructor_name.trim())
    .bind(&input.image)
    .bind(input.available_seats)
    .bind(input.price)
    .bind(CourseStatus::Pending.as_str())
    .bind(now)
    .bind(now)
    .execute(state.db.pool())
    .await?;

    tracing::info!("Course {} created by {} (pending review)", id, input.email);

    Ok(Json(InsertResult::new(id)))
}

/// Overwrite the mutable course fields, creating the row if it does not exist
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<CourseInput>,
) -> AppResult<Json<UpdateResult>> {
    input.validate()?;

    let now = Utc::now();
    let mut tx = state.db.pool().begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE classes
        SET name = ?, email = ?, instructor_name = ?, image = ?, available_seats = ?, price = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(input.name.trim())
    .bind(input.email.trim())
    .bind(input.instructor_name.trim())
    .bind(&input.image)
    .bind(input.available_seats)
    .bind(input.price)
    .bind(now)
    .bind(&id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let result = if updated > 0 {
        UpdateResult::matched(updated)
    } else {
        sqlx::query(
            r#"
            INSERT INTO classes (id, name, email, instructor_name, image, available_seats, price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(input.email.trim())
        .bind(input.instructor_name.trim())
        .bind(&input.image)
        .bind(input.available_seats)
        .bind(input.price)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        UpdateResult::upserted(id.clone())
    };

    tx.commit().await?;

    tracing::debug!("Course {} upserted: {:?}", id, result);

    Ok(Json(result))
}

/// Set the moderation status, creating a status-only row if the id is unknown
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SetStatusQuery>,
) -> AppResult<Json<UpdateResult>> {
    let status = query.require()?;

    let now = Utc::now();
    let mut tx = state.db.pool().begin().await?;

    let updated = sqlx::query("UPDATE classes SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now)
        .bind(&id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let result = if updated > 0 {
        UpdateResult::matched(updated)
    } else {
        sqlx::query("INSERT INTO classes (id, status, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(status.as_str())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        UpdateResult::upserted(id.clone())
    };

    tx.commit().await?;

    tracing::info!("Course {} status set to {}", id, status);

    Ok(Json(result))
}
