use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require_text, validate_email, validate_price};
use crate::error::{AppError, AppResult};

/// Course model
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub instructor_name: Option<String>,
    pub image: Option<String>,
    pub available_seats: Option<i64>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseStatus {
    Pending,
    Approved,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Pending => "pending",
            CourseStatus::Approved => "approved",
        }
    }
}

impl FromStr for CourseStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CourseStatus::Pending),
            "approved" => Ok(CourseStatus::Approved),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable course fields, used by both create and upsert.
///
/// Unknown keys in the body (including `status`) are dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub name: String,
    pub email: String,
    pub instructor_name: String,
    pub image: Option<String>,
    pub available_seats: i64,
    pub price: f64,
}

impl CourseInput {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name)?;
        validate_email(&self.email)?;
        require_text("instructorName", &self.instructor_name)?;
        if self.available_seats < 0 {
            return Err(AppError::InvalidInput(
                "availableSeats must not be negative".to_string(),
            ));
        }
        validate_price(self.price)
    }
}

/// Equality filters for `GET /myclasses`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilter {
    pub email: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub instructor_name: Option<String>,
}

/// `PATCH /courses/:id?status=`
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusQuery {
    pub status: Option<String>,
}

impl SetStatusQuery {
    pub fn require(&self) -> AppResult<CourseStatus> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingParameter("status"))?
            .parse()
    }
}
