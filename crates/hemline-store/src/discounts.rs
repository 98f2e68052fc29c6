//! In-memory discount catalog.

use hemline_commerce::error::CommerceError;
use hemline_commerce::ids::DiscountId;
use hemline_commerce::promo::{Discount, DiscountDraft};
use hemline_commerce::store::DiscountCatalog;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Discount catalog backed by a process-local map.
#[derive(Default)]
pub struct MemoryDiscountCatalog {
    discounts: RwLock<HashMap<DiscountId, Discount>>,
}

impl MemoryDiscountCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a discount, replacing any previous definition under the
    /// same id.
    pub fn insert(&self, discount: Discount) -> Result<(), CommerceError> {
        let mut discounts = self
            .discounts
            .write()
            .map_err(|_| CommerceError::StorageError("discount catalog lock poisoned".into()))?;
        discounts.insert(discount.id.clone(), discount);
        Ok(())
    }

    /// Validate an admin draft and store the resulting discount.
    ///
    /// Nothing is stored when validation rejects the draft.
    pub fn create(&self, draft: DiscountDraft, now: i64) -> Result<Discount, CommerceError> {
        let discount = draft.build(now)?;
        debug!(id = %discount.id, name = %discount.name, "discount created");
        self.insert(discount.clone())?;
        Ok(discount)
    }
}

impl DiscountCatalog for MemoryDiscountCatalog {
    fn valid_discounts(&self, now: i64) -> Result<Vec<Discount>, CommerceError> {
        let discounts = self
            .discounts
            .read()
            .map_err(|_| CommerceError::StorageError("discount catalog lock poisoned".into()))?;
        Ok(discounts
            .values()
            .filter(|d| d.is_valid_at(now))
            .cloned()
            .collect())
    }

    fn discount(&self, id: &DiscountId) -> Result<Option<Discount>, CommerceError> {
        let discounts = self
            .discounts
            .read()
            .map_err(|_| CommerceError::StorageError("discount catalog lock poisoned".into()))?;
        Ok(discounts.get(id).cloned())
    }

    fn discount_by_code(&self, code: &str) -> Result<Option<Discount>, CommerceError> {
        let discounts = self
            .discounts
            .read()
            .map_err(|_| CommerceError::StorageError("discount catalog lock poisoned".into()))?;
        Ok(discounts
            .values()
            .find(|d| d.code.as_deref() == Some(code))
            .cloned())
    }
}
