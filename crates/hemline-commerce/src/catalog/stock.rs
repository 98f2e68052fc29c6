//! Stock adjustment primitives.
//!
//! The fulfillment engine and the stores share one decrement kernel so
//! the clamp and skip rules cannot drift apart.

use crate::catalog::Product;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of one stock counter: product, then color, then size label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockKey {
    /// Product the counter belongs to.
    pub product_id: ProductId,
    /// Variant color name, matched exactly.
    pub color: String,
    /// Size label, matched exactly.
    pub size: String,
}

impl StockKey {
    /// Create a stock key.
    pub fn new(product_id: ProductId, color: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            product_id,
            color: color.into(),
            size: size.into(),
        }
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.product_id, self.color, self.size)
    }
}

/// What happened to one stock line during an adjustment pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentOutcome {
    /// The counter was decremented, clamping at zero.
    Applied {
        /// Count before the decrement.
        previous: i64,
        /// Count after the decrement.
        remaining: i64,
    },
    /// No product under the line's product id.
    SkippedMissingProduct,
    /// Product found, but no variant with the line's color.
    SkippedMissingVariant,
    /// Variant found, but no size row with the line's label.
    SkippedMissingSize,
    /// The store reported an error for this line.
    Failed {
        /// Backend error message, kept for the record.
        reason: String,
    },
}

impl AdjustmentOutcome {
    /// Check if the counter was actually decremented.
    pub fn is_applied(&self) -> bool {
        matches!(self, AdjustmentOutcome::Applied { .. })
    }

    /// Check if the line was skipped because part of the key is missing.
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            AdjustmentOutcome::SkippedMissingProduct
                | AdjustmentOutcome::SkippedMissingVariant
                | AdjustmentOutcome::SkippedMissingSize
        )
    }
}

/// Per-line record emitted by a stock adjustment pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// Product the line addressed.
    pub product_id: ProductId,
    /// Requested color.
    pub color: String,
    /// Requested size label.
    pub size: String,
    /// Units requested for removal.
    pub quantity: i64,
    /// What happened.
    pub outcome: AdjustmentOutcome,
}

/// Decrement one size counter inside `product`, clamping at zero.
///
/// A color or size label with no match is reported as a skip, never an
/// error. `quantity` comes from a validated order line and is positive.
pub fn decrement_size(
    product: &mut Product,
    color: &str,
    size: &str,
    quantity: i64,
) -> AdjustmentOutcome {
    let variant = match product.variant_mut(color) {
        Some(v) => v,
        None => return AdjustmentOutcome::SkippedMissingVariant,
    };
    let row = match variant.size_mut(size) {
        Some(s) => s,
        None => return AdjustmentOutcome::SkippedMissingSize,
    };
    let previous = row.stock;
    let remaining = row.deduct(quantity);
    AdjustmentOutcome::Applied {
        previous,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Variant;
    use crate::ids::CategoryId;
    use crate::money::{Currency, Money};

    fn tee() -> Product {
        Product::new(
            "Graphic Tee",
            CategoryId::new("cat-tees"),
            Money::new(200000, Currency::VND),
        )
        .with_variant(Variant::new("Đen").with_size("M", 20))
    }

    #[test]
    fn test_decrement_applies() {
        let mut product = tee();
        let outcome = decrement_size(&mut product, "Đen", "M", 5);
        assert_eq!(
            outcome,
            AdjustmentOutcome::Applied {
                previous: 20,
                remaining: 15,
            }
        );
        assert_eq!(product.variant("Đen").unwrap().size("M").unwrap().stock, 15);
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut product = tee();
        let outcome = decrement_size(&mut product, "Đen", "M", 50);
        assert_eq!(
            outcome,
            AdjustmentOutcome::Applied {
                previous: 20,
                remaining: 0,
            }
        );
    }

    #[test]
    fn test_missing_variant_is_skip() {
        let mut product = tee();
        let outcome = decrement_size(&mut product, "Navy", "M", 1);
        assert_eq!(outcome, AdjustmentOutcome::SkippedMissingVariant);
        assert!(outcome.is_skipped());
        assert_eq!(product.total_stock(), 20);
    }

    #[test]
    fn test_missing_size_is_skip() {
        let mut product = tee();
        let outcome = decrement_size(&mut product, "Đen", "XXL", 1);
        assert_eq!(outcome, AdjustmentOutcome::SkippedMissingSize);
        assert_eq!(product.total_stock(), 20);
    }

    #[test]
    fn test_stock_key_display() {
        let key = StockKey::new(ProductId::new("prod-9"), "Đen", "M");
        assert_eq!(key.to_string(), "prod-9/Đen/M");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::catalog::Variant;
    use crate::ids::CategoryId;
    use crate::money::{Currency, Money};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn stock_never_negative_and_never_grows(
            initial in 0i64..500,
            quantities in proptest::collection::vec(1i64..50, 0..20),
        ) {
            let mut product = Product::new(
                "Tee",
                CategoryId::new("cat"),
                Money::new(100000, Currency::VND),
            )
            .with_variant(Variant::new("Đen").with_size("M", initial));

            let mut last = initial;
            for qty in quantities {
                match decrement_size(&mut product, "Đen", "M", qty) {
                    AdjustmentOutcome::Applied { previous, remaining } => {
                        prop_assert_eq!(previous, last);
                        prop_assert!(remaining >= 0);
                        prop_assert!(remaining <= previous);
                        last = remaining;
                    }
                    other => prop_assert!(false, "unexpected outcome: {:?}", other),
                }
            }
        }
    }
}
