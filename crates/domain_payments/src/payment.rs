//! Payment entity and status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CollectionId, Money, PaymentId, PaymentReference, UserId};

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment via the gateway checkout page
    Card,
    /// Mobile money charge (MTN, AirtelTigo, Vodafone)
    MobileMoney,
    /// Direct bank transfer
    BankTransfer,
    /// USSD prompt
    Ussd,
    /// QR code scan
    QrCode,
}

impl PaymentMethod {
    /// Returns the wire code for this method
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Ussd => "ussd",
            PaymentMethod::QrCode => "qr_code",
        }
    }
}

/// Ghana mobile money network operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobileMoneyProvider {
    Mtn,
    Airteltigo,
    Vodafone,
}

impl MobileMoneyProvider {
    /// Returns the gateway's provider code
    pub fn code(&self) -> &'static str {
        match self {
            MobileMoneyProvider::Mtn => "mtn",
            MobileMoneyProvider::Airteltigo => "atl",
            MobileMoneyProvider::Vodafone => "vod",
        }
    }
}

/// Payment status
///
/// Transitions are monotonic: a payment moves forward through the state
/// machine and never leaves a terminal state. `PENDING` is only ever an
/// initial state, never a transition target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created locally, not yet acknowledged by the gateway
    Pending,
    /// In flight at the gateway
    Processing,
    /// Confirmed paid
    Success,
    /// Definitively failed
    Failed,
    /// Abandoned or cancelled before completion
    Cancelled,
}

impl PaymentStatus {
    /// Returns true if no further transition is permitted from this status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Success | PaymentStatus::Failed | PaymentStatus::Cancelled
        )
    }

    /// Returns true if the state machine permits moving to `target`
    ///
    /// Accepted transitions move from a non-terminal state to PROCESSING or
    /// a terminal state. Anything else (leaving a terminal state, returning
    /// to PENDING, self-loops) is rejected.
    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        !self.is_terminal() && target != PaymentStatus::Pending && target != *self
    }

    /// Returns the wire code for this status
    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A payment record
///
/// The reference is assigned exactly once at creation and is immutable;
/// status only changes through `PaymentLedger::apply_transition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Internal identifier
    pub id: PaymentId,
    /// Client- and gateway-visible unique reference
    pub reference: PaymentReference,
    /// Authenticated user the payment is attributed to
    pub user_id: UserId,
    /// Payment amount and currency
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// Current lifecycle status
    pub status: PaymentStatus,
    /// Free-text description
    pub description: Option<String>,
    /// Mobile money operator, for mobile money payments
    pub momo_provider: Option<MobileMoneyProvider>,
    /// Mobile money wallet number, for mobile money payments
    pub momo_number: Option<String>,
    /// Transaction id assigned by the gateway once known
    pub gateway_transaction_id: Option<String>,
    /// Customer email
    pub customer_email: String,
    /// Customer display name, when supplied
    pub customer_name: Option<String>,
    /// Collection this payment contributes to, if any
    pub collection_id: Option<CollectionId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Set exactly when the payment reaches a terminal status
    pub processed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Materializes a payment from a draft in its initial PENDING status
    pub fn from_draft(draft: PaymentDraft) -> Self {
        let now = Utc::now();

        Self {
            id: PaymentId::new_v7(),
            reference: draft.reference,
            user_id: draft.user_id,
            amount: draft.amount,
            method: draft.method,
            status: PaymentStatus::Pending,
            description: draft.description,
            momo_provider: draft.momo_provider,
            momo_number: draft.momo_number,
            gateway_transaction_id: None,
            customer_email: draft.customer_email,
            customer_name: draft.customer_name,
            collection_id: draft.collection_id,
            created_at: now,
            updated_at: now,
            processed_at: None,
        }
    }
}

/// The fields a caller supplies when creating a payment
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub reference: PaymentReference,
    pub user_id: UserId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub description: Option<String>,
    pub momo_provider: Option<MobileMoneyProvider>,
    pub momo_number: Option<String>,
    pub collection_id: Option<CollectionId>,
}

impl PaymentDraft {
    /// Creates a draft with the required fields
    pub fn new(
        reference: PaymentReference,
        user_id: UserId,
        amount: Money,
        method: PaymentMethod,
        customer_email: impl Into<String>,
    ) -> Self {
        Self {
            reference,
            user_id,
            amount,
            method,
            customer_email: customer_email.into(),
            customer_name: None,
            description: None,
            momo_provider: None,
            momo_number: None,
            collection_id: None,
        }
    }

    /// Sets the customer name
    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the mobile money details
    pub fn with_mobile_money(
        mut self,
        provider: MobileMoneyProvider,
        number: impl Into<String>,
    ) -> Self {
        self.momo_provider = Some(provider);
        self.momo_number = Some(number.into());
        self
    }

    /// Associates the payment with a collection
    pub fn with_collection(mut self, collection_id: CollectionId) -> Self {
        self.collection_id = Some(collection_id);
        self
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const ALL_STATUSES: [PaymentStatus; 5] = [
        PaymentStatus::Pending,
        PaymentStatus::Processing,
        PaymentStatus::Success,
        PaymentStatus::Failed,
        PaymentStatus::Cancelled,
    ];

    fn any_status() -> impl Strategy<Value = PaymentStatus> {
        prop::sample::select(ALL_STATUSES.to_vec())
    }

    proptest! {
        // Walk the machine with arbitrary signals: once a terminal state is
        // reached, no signal in the rest of the sequence may move it.
        #[test]
        fn status_is_monotonic(targets in prop::collection::vec(any_status(), 1..24)) {
            let mut status = PaymentStatus::Pending;
            let mut settled: Option<PaymentStatus> = None;

            for target in targets {
                if status.can_transition_to(target) {
                    prop_assert!(settled.is_none());
                    status = target;
                }
                if status.is_terminal() && settled.is_none() {
                    settled = Some(status);
                }
                if let Some(terminal) = settled {
                    prop_assert_eq!(status, terminal);
                    for t in ALL_STATUSES {
                        prop_assert!(!status.can_transition_to(t));
                    }
                }
            }
        }
    }
}
