use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::{validate_email, validate_price, DeleteResult, InsertResult};
use crate::error::{AppError, AppResult};

/// Payment record (append-only)
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub price: f64,
    pub cart_items: Json<Vec<String>>,
    pub course_ids: Json<Vec<String>>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payment record request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub email: String,
    pub price: f64,
    #[serde(default)]
    pub cart_items: Vec<String>,
    #[serde(default)]
    pub course_ids: Vec<String>,
    pub transaction_id: Option<String>,
}

impl NewPayment {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)?;
        validate_price(self.price)?;
        if self.cart_items.iter().any(|id| id.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "cartItems must not contain empty ids".to_string(),
            ));
        }
        if matches!(self.transaction_id.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "transactionId must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `POST /create-payment-intent` body
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

impl PaymentIntentRequest {
    /// Charge amount in minor currency units (cents), rounded to the nearest unit
    pub fn minor_units(&self) -> AppResult<i64> {
        to_minor_units(self.price)
    }
}

/// `POST /create-payment-intent` response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Outcome of recording a payment and clearing the paid cart rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub insert_result: InsertResult,
    pub delete_result: DeleteResult,
}

pub fn to_minor_units(price: f64) -> AppResult<i64> {
    validate_price(price)?;
    if price == 0.0 {
        return Err(AppError::InvalidPrice);
    }
    let cents = (price * 100.0).round();
    if cents > i64::MAX as f64 {
        return Err(AppError::InvalidPrice);
    }
    Ok(cents as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_price_converts_to_cents() {
        assert_eq!(to_minor_units(25.0).unwrap(), 2500);
        assert_eq!(to_minor_units(1.0).unwrap(), 100);
    }

    #[test]
    fn fractional_price_rounds_to_nearest_cent() {
        assert_eq!(to_minor_units(19.99).unwrap(), 1999);
        assert_eq!(to_minor_units(10.004).unwrap(), 1000);
        assert_eq!(to_minor_units(0.5).unwrap(), 50);
    }

    #[test]
    fn zero_negative_and_nan_prices_are_rejected() {
        assert!(matches!(to_minor_units(0.0), Err(AppError::InvalidPrice)));
        assert!(matches!(to_minor_units(-3.0), Err(AppError::InvalidPrice)));
        assert!(matches!(to_minor_units(f64::NAN), Err(AppError::InvalidPrice)));
    }

    #[test]
    fn payment_defaults_optional_lists() {
        let payment: NewPayment =
            serde_json::from_str(r#"{"email":"ana@example.com","price":30}"#).unwrap();
        assert!(payment.cart_items.is_empty());
        assert!(payment.course_ids.is_empty());
        assert!(payment.validate().is_ok());
    }

    #[test]
    fn blank_transaction_id_is_rejected() {
        let payment: NewPayment = serde_json::from_str(
            r#"{"email":"ana@example.com","price":30,"transactionId":" "}"#,
        )
        .unwrap();
        assert!(payment.validate().is_err());
    }
}
