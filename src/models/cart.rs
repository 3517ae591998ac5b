use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require_text, validate_email, validate_price};
use crate::error::AppResult;

/// Cart item
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub course_id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

/// Add-to-cart request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub email: String,
    pub course_id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: f64,
}

impl NewCartItem {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)?;
        require_text("courseId", &self.course_id)?;
        validate_price(self.price)
    }
}
