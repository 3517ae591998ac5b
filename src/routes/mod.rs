pub mod cart;
pub mod courses;
pub mod instructors;
pub mod payments;
pub mod users;

use axum::http::StatusCode;

/// Health check endpoint
pub async fn health() -> StatusCode {
    StatusCode::OK
}
