//! Payment DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::CollectionId;
use domain_payments::{MobileMoneyProvider, Payment, PaymentMethod, PaymentStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct InitializePaymentRequest {
    pub amount: Decimal,
    #[validate(email)]
    pub email: String,
    pub payment_method: PaymentMethod,
    #[validate(url)]
    pub callback_url: Option<String>,
    pub collection_id: Option<CollectionId>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MobileMoneyRequest {
    pub amount: Decimal,
    #[validate(length(min = 9, max = 20))]
    pub phone: String,
    pub provider: MobileMoneyProvider,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub collection_id: Option<CollectionId>,
}

/// Standard success envelope mirroring the gateway's own response shape
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct InitializeData {
    pub reference: String,
    pub authorization_url: String,
    pub access_code: String,
}

#[derive(Debug, Serialize)]
pub struct MobileMoneyData {
    pub reference: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<CollectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            reference: payment.reference.to_string(),
            amount: payment.amount.amount(),
            currency: payment.amount.currency().to_string(),
            status: payment.status,
            payment_method: payment.method,
            customer_email: payment.customer_email,
            customer_name: payment.customer_name,
            description: payment.description,
            collection_id: payment.collection_id,
            gateway_transaction_id: payment.gateway_transaction_id,
            created_at: payment.created_at,
            processed_at: payment.processed_at,
        }
    }
}
