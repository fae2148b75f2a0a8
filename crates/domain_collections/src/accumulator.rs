//! Collection store and credit accumulator
//!
//! Credits arrive from the payments core whenever a payment linked to a
//! collection settles successfully. Each collection sits behind its own
//! mutex, so the read-add-write of a credit is atomic per collection:
//! N concurrent credits of amount A land as exactly N x A, with no lost
//! updates and no double counts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use core_kernel::{CollectionCreditPort, CollectionId, CreditError, Money};

use crate::collection::{Collection, CollectionDraft};
use crate::error::CollectionError;

/// In-process store of collections
#[derive(Debug, Default)]
pub struct CollectionStore {
    collections: RwLock<HashMap<CollectionId, Arc<Mutex<Collection>>>>,
}

impl CollectionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection and returns it
    pub async fn create(&self, draft: CollectionDraft) -> Result<Collection, CollectionError> {
        if draft.title.trim().is_empty() {
            return Err(CollectionError::Invalid("title is required".into()));
        }

        let collection = Collection::new(draft);
        let mut collections = self.collections.write().await;
        collections.insert(collection.id, Arc::new(Mutex::new(collection.clone())));
        Ok(collection)
    }

    /// Returns a collection by id
    pub async fn get(&self, id: CollectionId) -> Result<Collection, CollectionError> {
        let entry = self.entry(id).await?;
        let guard = entry.lock().await;
        Ok(guard.clone())
    }

    /// Returns all public collections, oldest first
    pub async fn list_public(&self) -> Vec<Collection> {
        let entries: Vec<_> = {
            let collections = self.collections.read().await;
            collections.values().cloned().collect()
        };

        let mut result = Vec::with_capacity(entries.len());
        for entry in entries {
            let guard = entry.lock().await;
            if guard.is_public {
                result.push(guard.clone());
            }
        }
        result.sort_by_key(|c| c.created_at);
        result
    }

    async fn entry(&self, id: CollectionId) -> Result<Arc<Mutex<Collection>>, CollectionError> {
        let collections = self.collections.read().await;
        collections
            .get(&id)
            .cloned()
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl CollectionCreditPort for CollectionStore {
    async fn apply_credit(
        &self,
        collection_id: CollectionId,
        amount: Money,
    ) -> Result<Money, CreditError> {
        if !amount.is_positive() {
            return Err(CreditError::InvalidAmount(amount));
        }

        let entry = {
            let collections = self.collections.read().await;
            collections
                .get(&collection_id)
                .cloned()
                .ok_or(CreditError::NotFound(collection_id))?
        };

        // Read-add-write under the collection's own lock
        let mut collection = entry.lock().await;
        let new_total = collection
            .current_amount
            .checked_add(&amount)
            .map_err(|_| CreditError::CurrencyMismatch {
                expected: collection.current_amount.currency().to_string(),
                actual: amount.currency().to_string(),
            })?;
        collection.current_amount = new_total;
        collection.updated_at = chrono::Utc::now();

        info!(
            collection = %collection_id,
            amount = %amount,
            total = %new_total,
            "collection credited"
        );
        Ok(new_total)
    }
}
