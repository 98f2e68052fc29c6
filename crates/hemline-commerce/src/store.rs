//! Repository contracts consumed by the engines.
//!
//! The discount catalog and the product stock tree are owned by the
//! catalog/admin domain; this crate only defines the seams and injects
//! implementations into the engines. All traits are object safe and
//! synchronous.

use crate::catalog::{AdjustmentOutcome, Product, StockKey};
use crate::error::CommerceError;
use crate::ids::{DiscountId, OrderId, ProductId};
use crate::orders::Order;
use crate::promo::Discount;

/// Read access to the promotional discount catalog.
pub trait DiscountCatalog: Send + Sync {
    /// List discounts currently valid at `now`.
    fn valid_discounts(&self, now: i64) -> Result<Vec<Discount>, CommerceError>;

    /// Fetch one discount by id.
    fn discount(&self, id: &DiscountId) -> Result<Option<Discount>, CommerceError>;

    /// Fetch one discount by redeem code.
    fn discount_by_code(&self, code: &str) -> Result<Option<Discount>, CommerceError>;
}

/// Access to the product stock tree.
pub trait ProductStore: Send + Sync {
    /// Fetch one product by id.
    fn product(&self, id: &ProductId) -> Result<Option<Product>, CommerceError>;

    /// Persist a product, replacing any existing record.
    fn save_product(&self, product: Product) -> Result<(), CommerceError>;

    /// Atomically remove up to `quantity` units at `key`, clamping the
    /// counter at zero.
    ///
    /// The lookup, clamp and write must happen inside one critical
    /// section so concurrent decrements of the same counter cannot lose
    /// updates. A missing product, variant or size is an
    /// [`AdjustmentOutcome`] skip, not an error; errors are reserved for
    /// backend failures (`StorageError`, or `ConcurrencyConflict` from
    /// backends that detect contention instead of serializing). The
    /// fulfillment engine records such errors per line and moves on.
    fn decrement_stock(
        &self,
        key: &StockKey,
        quantity: i64,
    ) -> Result<AdjustmentOutcome, CommerceError>;
}

/// Access to placed orders.
pub trait OrderStore: Send + Sync {
    /// Fetch one order by id.
    fn order(&self, id: &OrderId) -> Result<Option<Order>, CommerceError>;

    /// Persist an order, replacing any existing record.
    fn save_order(&self, order: Order) -> Result<(), CommerceError>;
}
