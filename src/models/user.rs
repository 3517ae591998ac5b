use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validate_email;
use crate::config::RegistrationPolicy;
use crate::error::AppResult;

/// User roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "instructor" => UserRole::Instructor,
            "admin" => UserRole::Admin,
            _ => UserRole::Student,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Student => "student".to_string(),
            UserRole::Instructor => "instructor".to_string(),
            UserRole::Admin => "admin".to_string(),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Registration request. New users always start as students.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)
    }
}

/// What `POST /users` should do for a given lookup outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    Insert,
    AlreadyExists,
}

impl RegistrationAction {
    pub fn decide(policy: RegistrationPolicy, existing: bool) -> Self {
        match (policy, existing) {
            (RegistrationPolicy::Corrected, false) | (RegistrationPolicy::Inverted, true) => {
                RegistrationAction::Insert
            }
            (RegistrationPolicy::Corrected, true) | (RegistrationPolicy::Inverted, false) => {
                RegistrationAction::AlreadyExists
            }
        }
    }
}

/// Body returned when registration is skipped
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationMessage {
    pub message: &'static str,
}

impl RegistrationMessage {
    pub const ALREADY_EXISTS: Self = Self {
        message: "user already exist",
    };
}
