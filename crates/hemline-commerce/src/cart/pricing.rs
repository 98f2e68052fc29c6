//! Cart pricing aggregation.
//!
//! Sums line prices into cart totals. Listing discounts already live in
//! each line's sale price; the single checkout discount is subtracted
//! once from the cart total, never per line.

use crate::cart::CartItem;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use crate::promo::{resolve_checkout_discount, Discount};
use serde::{Deserialize, Serialize};

/// Pricing breakdown for a cart or order-to-be.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// List-price subtotal (sum of unit_price * quantity).
    pub subtotal: Money,
    /// Sale-price subtotal (sum of sale_price * quantity).
    pub sale_subtotal: Money,
    /// Cart-level discount subtracted from the total. Zero until a
    /// checkout resolution is applied.
    pub discount_amount: Money,
    /// Amount to charge (sale subtotal minus the cart-level discount,
    /// floored at zero).
    pub total: Money,
}

impl CartTotals {
    /// Totals for an empty cart.
    pub fn empty(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            sale_subtotal: Money::zero(currency),
            discount_amount: Money::zero(currency),
            total: Money::zero(currency),
        }
    }

    /// Apply a cart-level discount once against the sale subtotal.
    ///
    /// # Panics
    /// Panics if the amount's currency does not match the totals.
    pub fn with_cart_discount(mut self, amount: Money) -> Self {
        self.total = self.sale_subtotal.sub_to_zero(&amount);
        self.discount_amount = amount;
        self
    }

    /// Reduction from listing discounts across the lines.
    pub fn line_savings(&self) -> Money {
        self.subtotal.sub_to_zero(&self.sale_subtotal)
    }

    /// Total reduction against the list-price subtotal.
    pub fn savings(&self) -> Money {
        self.subtotal.sub_to_zero(&self.total)
    }

    /// Check if any discount lowered the amount to charge.
    pub fn has_discounts(&self) -> bool {
        self.total.amount_cents < self.subtotal.amount_cents
    }
}

/// Aggregate cart lines into totals, before any cart-level discount.
///
/// `total` starts at the sale subtotal; use
/// [`CartTotals::with_cart_discount`] or [`quote_cart`] to subtract the
/// checkout discount. Returns an error on arithmetic overflow or a line
/// priced in another currency.
pub fn compute_cart_totals(
    items: &[CartItem],
    currency: Currency,
) -> Result<CartTotals, CommerceError> {
    let mut subtotal = Money::zero(currency);
    let mut sale_subtotal = Money::zero(currency);

    for item in items {
        subtotal = subtotal
            .try_add(&item.subtotal)
            .ok_or(CommerceError::Overflow)?;
        sale_subtotal = sale_subtotal
            .try_add(&item.sale_subtotal()?)
            .ok_or(CommerceError::Overflow)?;
    }

    Ok(CartTotals {
        subtotal,
        sale_subtotal,
        discount_amount: Money::zero(currency),
        total: sale_subtotal,
    })
}

/// Cart totals plus the checkout discount that produced them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartQuote {
    /// Aggregated totals with the discount already subtracted.
    pub totals: CartTotals,
    /// The winning checkout discount, if any.
    pub discount: Option<Discount>,
}

/// Quote a cart end to end: aggregate the lines, resolve the single
/// checkout discount over the sale subtotal and aggregate quantity, and
/// fold its amount into the totals.
pub fn quote_cart(
    items: &[CartItem],
    currency: Currency,
    candidates: &[Discount],
) -> Result<CartQuote, CommerceError> {
    let totals = compute_cart_totals(items, currency)?;
    let total_quantity: i64 = items.iter().map(|i| i.quantity).sum();

    let resolution =
        resolve_checkout_discount(items, totals.sale_subtotal, total_quantity, candidates);

    Ok(CartQuote {
        totals: totals.with_cart_discount(resolution.discount_amount),
        discount: resolution.discount,
    })
}
