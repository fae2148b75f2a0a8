//! Payment handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use validator::Validate;

use core_kernel::PaymentReference;
use domain_payments::{InitiatePayment, MobileMoneyPayment, PaymentStats};

use crate::auth::Claims;
use crate::dto::payments::{
    InitializeData, InitializePaymentRequest, MobileMoneyData, MobileMoneyRequest,
    PaymentResponse, SuccessEnvelope,
};
use crate::error::ApiError;
use crate::AppState;

/// Header the gateway uses to carry the webhook body signature
const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Initializes a payment transaction
pub async fn initialize_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<InitializePaymentRequest>,
) -> Result<Json<SuccessEnvelope<InitializeData>>, ApiError> {
    request.validate()?;
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;

    let initialized = state
        .engine
        .initialize_payment(InitiatePayment {
            user_id,
            amount: request.amount,
            email: request.email,
            method: request.payment_method,
            callback_url: request.callback_url,
            collection_id: request.collection_id,
            description: request.description,
        })
        .await?;

    Ok(Json(
        SuccessEnvelope::new(InitializeData {
            reference: initialized.payment.reference.to_string(),
            authorization_url: initialized.authorization_url,
            access_code: initialized.access_code,
        })
        .with_message("Payment initialized"),
    ))
}

/// Submits a mobile money payment
pub async fn mobile_money_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<MobileMoneyRequest>,
) -> Result<Json<SuccessEnvelope<MobileMoneyData>>, ApiError> {
    request.validate()?;
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;

    let payment = state
        .engine
        .submit_mobile_money(MobileMoneyPayment {
            user_id,
            amount: request.amount,
            phone: request.phone,
            provider: request.provider,
            email: request.email,
            name: request.name,
            collection_id: request.collection_id,
        })
        .await?;

    Ok(Json(
        SuccessEnvelope::new(MobileMoneyData {
            reference: payment.reference.to_string(),
            status: payment.status,
        })
        .with_message("Mobile money payment submitted"),
    ))
}

/// Reconciles a payment against the gateway and returns its state
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<SuccessEnvelope<PaymentResponse>>, ApiError> {
    let reference = parse_reference(&reference)?;
    let payment = state.engine.verify(&reference).await?;
    Ok(Json(SuccessEnvelope::new(PaymentResponse::from(payment))))
}

/// Handles gateway webhook events
///
/// The body is taken raw because the signature covers the exact bytes the
/// gateway sent. A verified event is always acknowledged with 200 whether
/// or not it changed anything, so the gateway does not retry.
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    state.engine.handle_webhook(&body, signature).await?;

    Ok(Json(serde_json::json!({ "status": "success" })))
}

/// Returns aggregate payment statistics
pub async fn payment_stats(
    State(state): State<AppState>,
) -> Result<Json<PaymentStats>, ApiError> {
    Ok(Json(state.ledger.stats().await))
}

/// Lists all payments
pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state.ledger.list().await;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Returns a single payment from the ledger, without reconciling
pub async fn get_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let reference = parse_reference(&reference)?;
    let payment = state
        .ledger
        .get(&reference)
        .await
        .map_err(domain_payments::PaymentError::from)?;
    Ok(Json(PaymentResponse::from(payment)))
}

fn parse_reference(raw: &str) -> Result<PaymentReference, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("Payment not found: {raw}")))
}
