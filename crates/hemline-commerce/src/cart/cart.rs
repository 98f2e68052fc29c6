//! Cart and cart line types.
//!
//! Lines are keyed by (product, color, size); adding the same key again
//! merges quantities. Every line carries the list price it was added at
//! and a sale price the listing resolution may lower.

use crate::cart::{compute_cart_totals, quote_cart, CartQuote, CartTotals};
use crate::error::CommerceError;
use crate::ids::{CartId, ProductId, UserId};
use crate::money::{Currency, Money};
use crate::promo::{resolve_listing_price, Discount};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A shopping cart. One per user, superseded by an order at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// Lines in the cart.
    pub items: Vec<CartItem>,
    /// Cart currency. Every line must match.
    pub currency: Currency,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart for a user in the storefront currency.
    pub fn new(user_id: UserId) -> Self {
        Self::with_currency(user_id, Currency::default())
    }

    /// Create an empty cart in an explicit currency.
    pub fn with_currency(user_id: UserId, currency: Currency) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            user_id,
            items: Vec::new(),
            currency,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add units of one (product, color, size) line.
    ///
    /// An existing line with the same key has its quantity merged and
    /// keeps the list price it was added at. Returns an error if:
    /// - quantity is not positive
    /// - the price currency does not match the cart
    /// - the merged quantity would exceed MAX_QUANTITY_PER_ITEM
    /// - arithmetic overflow would occur
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        color: impl Into<String>,
        size: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: unit_price.currency.code().to_string(),
            });
        }

        let color = color.into();
        let size = size.into();

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.matches(&product_id, &color, &size))
        {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;

            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }

            existing.quantity = new_quantity;
            existing.update_subtotal()?;
            self.updated_at = current_timestamp();
            return Ok(());
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let item = CartItem::new(product_id, color, size, quantity, unit_price)?;
        self.items.push(item);
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Update the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. Returns whether a
    /// line was touched.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id, color, size));
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.matches(product_id, color, size))
        {
            item.quantity = quantity;
            item.update_subtotal()?;
            self.updated_at = current_timestamp();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove a line from the cart.
    pub fn remove_item(&mut self, product_id: &ProductId, color: &str, size: &str) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| !i.matches(product_id, color, size));
        let removed = self.items.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Clear all lines from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = current_timestamp();
    }

    /// Get a line by key.
    pub fn item(&self, product_id: &ProductId, color: &str, size: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(product_id, color, size))
    }

    /// Get total unit count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Get number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reapply listing resolution to every line's sale price.
    ///
    /// Called whenever the valid discount set may have changed, so the
    /// cart shows the same prices the listing pages do. Lines no percent
    /// discount covers fall back to their list price.
    pub fn reprice(&mut self, candidates: &[Discount]) {
        for item in &mut self.items {
            let quote = resolve_listing_price(&item.product_id, item.unit_price, candidates);
            item.sale_price = quote.final_price;
        }
        self.updated_at = current_timestamp();
    }

    /// Aggregate the cart into totals, before any cart-level discount.
    pub fn totals(&self) -> Result<CartTotals, CommerceError> {
        compute_cart_totals(&self.items, self.currency)
    }

    /// Totals plus the single checkout discount resolved over the cart.
    pub fn quote(&self, candidates: &[Discount]) -> Result<CartQuote, CommerceError> {
        quote_cart(&self.items, self.currency, candidates)
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Variant color.
    pub color: String,
    /// Size label.
    pub size: String,
    /// Quantity.
    pub quantity: i64,
    /// List price per unit when the line was added.
    pub unit_price: Money,
    /// Price per unit after listing resolution. Defaults to the list
    /// price until `Cart::reprice` runs.
    pub sale_price: Money,
    /// List-price subtotal (unit_price * quantity).
    pub subtotal: Money,
}

impl CartItem {
    /// Create a cart line.
    pub fn new(
        product_id: ProductId,
        color: impl Into<String>,
        size: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let subtotal = unit_price
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            product_id,
            color: color.into(),
            size: size.into(),
            quantity,
            unit_price,
            sale_price: unit_price,
            subtotal,
        })
    }

    /// Check whether this line carries the given key.
    pub fn matches(&self, product_id: &ProductId, color: &str, size: &str) -> bool {
        &self.product_id == product_id && self.color == color && self.size == size
    }

    /// Recompute the list-price subtotal after a quantity change.
    pub fn update_subtotal(&mut self) -> Result<(), CommerceError> {
        self.subtotal = self
            .unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(())
    }

    /// Sale-price subtotal (sale_price * quantity).
    pub fn sale_subtotal(&self) -> Result<Money, CommerceError> {
        self.sale_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
