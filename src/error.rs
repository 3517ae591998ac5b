use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid course status: {0}")]
    InvalidStatus(String),

    #[error("Invalid price")]
    InvalidPrice,

    // Course errors
    #[error("Course not found")]
    CourseNotFound,

    #[error("No courses found")]
    NoCourses,

    // Instructor errors
    #[error("No instructors found")]
    NoInstructors,

    // Cart errors
    #[error("Cart is empty")]
    CartEmpty,

    // User errors
    #[error("User not found")]
    UserNotFound,

    // Payment errors
    #[error("Payment already recorded for transaction {0}")]
    PaymentAlreadyRecorded(String),

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_)
            | AppError::InvalidInput(_)
            | AppError::InvalidStatus(_)
            | AppError::InvalidPrice => StatusCode::BAD_REQUEST,

            // Empty result sets are reported as 404 alongside missing rows
            AppError::CourseNotFound
            | AppError::NoCourses
            | AppError::NoInstructors
            | AppError::CartEmpty
            | AppError::UserNotFound => StatusCode::NOT_FOUND,

            AppError::PaymentAlreadyRecorded(_) => StatusCode::CONFLICT,

            AppError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,

            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                "Internal server error".to_string()
            }
            AppError::PaymentGateway(_) => {
                tracing::error!("{}", self);
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_map_to_not_found() {
        for err in [
            AppError::NoCourses,
            AppError::NoInstructors,
            AppError::CartEmpty,
            AppError::CourseNotFound,
            AppError::UserNotFound,
        ] {
            assert_eq!(err.status(), StatusCode::NOT_FOUND, "{err}");
        }
    }

    #[test]
    fn store_failures_hide_details() {
        let response = AppError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_parameter_is_client_error() {
        let err = AppError::MissingParameter("email");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing required parameter: email");
    }
}
