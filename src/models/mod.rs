mod cart;
mod course;
mod instructor;
mod payment;
mod results;
mod user;

pub use cart::*;
pub use course::*;
pub use instructor::*;
pub use payment::*;
pub use results::*;
pub use user::*;

use crate::error::{AppError, AppResult};

/// Shared `?email=` query
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    /// The trimmed email, or `MissingParameter` when absent or blank
    pub fn require(&self) -> AppResult<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(AppError::MissingParameter("email"))
    }
}

pub(crate) fn validate_email(email: &str) -> AppResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::InvalidInput(format!("invalid email: {:?}", email))),
    }
}

pub(crate) fn validate_price(price: f64) -> AppResult<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(AppError::InvalidPrice)
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
