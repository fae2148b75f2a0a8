//! Shared port traits
//!
//! Cross-domain capabilities are expressed as port traits defined here, so
//! a domain can consume a capability without depending on the crate that
//! implements it. The payments domain credits collections through
//! [`CollectionCreditPort`]; the collections crate provides the adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::identifiers::CollectionId;
use crate::money::Money;

/// Errors from applying a credit to a collection
#[derive(Debug, Error)]
pub enum CreditError {
    /// The collection does not exist
    #[error("Collection not found: {0}")]
    NotFound(CollectionId),

    /// The credit amount is zero or negative
    #[error("Invalid credit amount: {0}")]
    InvalidAmount(Money),

    /// The credit currency does not match the collection currency
    #[error("Currency mismatch: collection is {expected}, credit is {actual}")]
    CurrencyMismatch { expected: String, actual: String },
}

/// Capability to fold a confirmed payment amount into a collection total
///
/// Implementations must linearize concurrent credits to the same collection
/// and must never apply a non-positive amount. The payments core holds only
/// this capability; it has no other mutation rights over collections.
#[async_trait]
pub trait CollectionCreditPort: Send + Sync + 'static {
    /// Atomically adds `amount` to the collection's current total
    ///
    /// # Returns
    ///
    /// The collection's new total after the credit
    async fn apply_credit(
        &self,
        collection_id: CollectionId,
        amount: Money,
    ) -> Result<Money, CreditError>;
}
