//! Scripted gateway double
//!
//! Implements [`GatewayPort`] without any network I/O. Initialize and
//! charge calls succeed by default; verify results are scripted per call;
//! webhook signatures are real HMAC-SHA512 over the given secret, so tests
//! exercise the production verification path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use core_kernel::PaymentReference;
use domain_payments::adapters::signature;
use domain_payments::{
    ChargeResponse, GatewayError, GatewayPort, GatewayStatus, InitializeRequest,
    InitializeResponse, MobileMoneyCharge, VerificationResponse,
};

/// In-memory gateway for tests
pub struct MockGateway {
    secret: String,
    verify_results: Mutex<VecDeque<Result<VerificationResponse, GatewayError>>>,
    unavailable: AtomicBool,
    decline_charges: AtomicBool,
    initialize_calls: AtomicUsize,
    charge_calls: AtomicUsize,
}

impl MockGateway {
    /// Creates a gateway signing webhooks with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            verify_results: Mutex::new(VecDeque::new()),
            unavailable: AtomicBool::new(false),
            decline_charges: AtomicBool::new(false),
            initialize_calls: AtomicUsize::new(0),
            charge_calls: AtomicUsize::new(0),
        }
    }

    /// Signs a webhook body the way the gateway would
    pub fn sign(&self, body: &[u8]) -> String {
        signature::sign(&self.secret, body)
    }

    /// Scripts the result of the next verify call
    pub async fn queue_verify(&self, result: Result<VerificationResponse, GatewayError>) {
        self.verify_results.lock().await.push_back(result);
    }

    /// Scripts a successful verify with the given status
    pub async fn queue_verify_status(&self, status: GatewayStatus) {
        self.queue_verify(Ok(VerificationResponse {
            status,
            transaction_id: Some("555001".to_string()),
            amount_minor: None,
            currency: Some("GHS".to_string()),
        }))
        .await;
    }

    /// Makes all network calls fail as unavailable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes mobile money charges come back declined
    pub fn set_decline_charges(&self, decline: bool) {
        self.decline_charges.store(decline, Ordering::SeqCst);
    }

    /// Number of initialize calls observed
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// Number of charge calls observed
    pub fn charge_calls(&self) -> usize {
        self.charge_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(GatewayError::Unavailable {
                message: "scripted outage".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GatewayPort for MockGateway {
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializeResponse, GatewayError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(InitializeResponse {
            authorization_url: format!(
                "https://checkout.paystack.test/{}",
                request.reference.as_str()
            ),
            access_code: format!("AC_{}", request.amount_minor),
        })
    }

    async fn charge_mobile_money(
        &self,
        _charge: MobileMoneyCharge,
    ) -> Result<ChargeResponse, GatewayError> {
        self.charge_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if self.decline_charges.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                message: "Charge attempted and declined".into(),
            });
        }
        Ok(ChargeResponse {
            status: GatewayStatus::Pending,
        })
    }

    async fn verify(
        &self,
        _reference: &PaymentReference,
    ) -> Result<VerificationResponse, GatewayError> {
        self.check_available()?;
        self.verify_results.lock().await.pop_front().unwrap_or_else(|| {
            Ok(VerificationResponse {
                status: GatewayStatus::Pending,
                transaction_id: None,
                amount_minor: None,
                currency: Some("GHS".to_string()),
            })
        })
    }

    fn verify_webhook_signature(&self, raw_body: &[u8], sig: &str) -> bool {
        signature::verify(&self.secret, raw_body, sig)
    }
}
