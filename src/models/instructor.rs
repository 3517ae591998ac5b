use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Instructor profile
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}
