//! Paystack gateway adapter
//!
//! Implements [`GatewayPort`] against the Paystack HTTP API. The adapter
//! holds no request state, so a single instance is shared across all
//! concurrent calls.
//!
//! # Error Mapping
//!
//! - Connect failures and timeouts -> `GatewayError::Unavailable`
//! - `status: false` envelopes -> `GatewayError::Rejected`
//! - Bodies that do not match the envelope -> `GatewayError::Malformed`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use core_kernel::PaymentReference;

use crate::ports::{
    ChargeResponse, GatewayError, GatewayPort, GatewayStatus, InitializeRequest,
    InitializeResponse, MobileMoneyCharge, VerificationResponse,
};
use super::signature;

/// Configuration for the Paystack adapter
#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// Integration secret key (also the webhook signing key)
    pub secret_key: String,
    /// API base URL
    pub base_url: String,
    /// Bound on every outbound call
    pub timeout: Duration,
}

impl PaystackConfig {
    /// Creates a configuration with the production base URL and a 30s timeout
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: "https://api.paystack.co".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the base URL (test servers, mock endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Every Paystack response is wrapped in this envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    status: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// Paystack HTTP client
#[derive(Debug, Clone)]
pub struct PaystackGateway {
    http: reqwest::Client,
    config: PaystackConfig,
}

impl PaystackGateway {
    /// Builds the adapter with a pooled HTTP client
    pub fn new(config: PaystackConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable {
                message: format!("failed to build http client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<Envelope, GatewayError> {
        debug!(path, "gateway POST");
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.config.secret_key)
            .json(payload)
            .send()
            .await
            .map_err(classify_transport)?;

        Self::decode(response).await
    }

    async fn get(&self, path: &str) -> Result<Envelope, GatewayError> {
        debug!(path, "gateway GET");
        let response = self
            .http
            .get(self.endpoint(path))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(classify_transport)?;

        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Envelope, GatewayError> {
        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        if !envelope.status {
            return Err(GatewayError::Rejected {
                message: envelope.message,
            });
        }
        Ok(envelope)
    }
}

/// Collapses reqwest transport errors into the port's taxonomy
fn classify_transport(err: reqwest::Error) -> GatewayError {
    if err.is_decode() {
        GatewayError::Malformed(err.to_string())
    } else {
        GatewayError::Unavailable {
            message: err.to_string(),
        }
    }
}

fn data_str(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// The gateway reports transaction ids as numbers; logs and the ledger
/// carry them as strings.
fn data_id(data: &Value) -> Option<String> {
    match data.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl GatewayPort for PaystackGateway {
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializeResponse, GatewayError> {
        let mut payload = json!({
            "amount": request.amount_minor,
            "email": request.email,
            "reference": request.reference.as_str(),
            "currency": "GHS",
        });
        if let Some(callback_url) = &request.callback_url {
            payload["callback_url"] = json!(callback_url);
        }

        let envelope = self.post("/transaction/initialize", &payload).await?;

        let authorization_url = data_str(&envelope.data, "authorization_url")
            .ok_or_else(|| GatewayError::Malformed("missing authorization_url".into()))?;
        let access_code = data_str(&envelope.data, "access_code")
            .ok_or_else(|| GatewayError::Malformed("missing access_code".into()))?;

        Ok(InitializeResponse {
            authorization_url,
            access_code,
        })
    }

    async fn charge_mobile_money(
        &self,
        charge: MobileMoneyCharge,
    ) -> Result<ChargeResponse, GatewayError> {
        let payload = json!({
            "amount": charge.amount_minor,
            "email": charge.email,
            "currency": "GHS",
            "reference": charge.reference.as_str(),
            "mobile_money": {
                "phone": charge.phone,
                "provider": charge.provider.code(),
            },
        });

        let envelope = self.post("/charge", &payload).await?;

        let status = data_str(&envelope.data, "status")
            .map(|code| GatewayStatus::from_code(&code))
            .unwrap_or(GatewayStatus::Pending);

        Ok(ChargeResponse { status })
    }

    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<VerificationResponse, GatewayError> {
        let envelope = self
            .get(&format!("/transaction/verify/{}", reference.as_str()))
            .await?;

        let status = data_str(&envelope.data, "status")
            .map(|code| GatewayStatus::from_code(&code))
            .ok_or_else(|| GatewayError::Malformed("missing transaction status".into()))?;

        Ok(VerificationResponse {
            status,
            transaction_id: data_id(&envelope.data),
            amount_minor: envelope.data.get("amount").and_then(Value::as_i64),
            currency: data_str(&envelope.data, "currency"),
        })
    }

    fn verify_webhook_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        signature::verify(&self.config.secret_key, raw_body, signature)
    }
}
