use std::sync::Arc;

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::{
    CheckoutResult, InsertResult, NewPayment, PaymentIntentRequest, PaymentIntentResponse,
};
use crate::services::CheckoutService;
use crate::AppState;

/// Ask the processor for a payment intent sized in minor units
pub async fn create_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PaymentIntentRequest>,
) -> AppResult<Json<PaymentIntentResponse>> {
    let amount = request.minor_units()?;
    let intent = state.payments.create_intent(amount).await?;

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Record a settled payment and clear the purchased cart rows
pub async fn record(
    State(state): State<Arc<AppState>>,
    Json(payment): Json<NewPayment>,
) -> AppResult<Json<CheckoutResult>> {
    payment.validate()?;

    let result = CheckoutService::record_payment(&state.db, &payment).await?;

    Ok(Json(result))
}

/// `GET /payments`: appends the body to the payment log, cart untouched
pub async fn append(
    State(state): State<Arc<AppState>>,
    Json(payment): Json<NewPayment>,
) -> AppResult<Json<InsertResult>> {
    payment.validate()?;

    let result = CheckoutService::append_payment(&state.db, &payment).await?;

    Ok(Json(result))
}
