//! Common fixtures and webhook event builders

use core_kernel::PaymentReference;

/// Test webhook signing secret shared across suites
pub const TEST_GATEWAY_SECRET: &str = "sk_test_fixture_secret";

/// Builds a `charge.success` webhook body for a reference
pub fn charge_success_event(reference: &PaymentReference) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "event": "charge.success",
        "data": {
            "reference": reference.as_str(),
            "id": 31415926,
            "status": "success",
            "currency": "GHS"
        }
    }))
    .expect("webhook body serializes")
}

/// Builds a `charge.failed` webhook body for a reference
pub fn charge_failed_event(reference: &PaymentReference) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "event": "charge.failed",
        "data": {
            "reference": reference.as_str(),
            "id": 27182818,
            "status": "failed",
            "currency": "GHS"
        }
    }))
    .expect("webhook body serializes")
}

/// Sample customer fixtures
pub mod customers {
    pub const EMAIL: &str = "kwame.owusu@example.com";
    pub const NAME: &str = "Kwame Owusu";
    pub const PHONE: &str = "+233244123456";
}
