//! Discount resolution policies.
//!
//! Listing pages and checkout resolve the winning discount under two
//! deliberately different policies. Listing considers percent
//! promotions only and picks the lowest resulting price, breaking ties
//! toward the lower priority value. Checkout considers every kind,
//! applies exactly one discount cart-wide, and picks the largest
//! amount off, breaking ties toward the higher priority value.

use crate::cart::CartItem;
use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::Money;
use crate::promo::{Discount, DiscountKind, DiscountType};
use serde::{Deserialize, Serialize};

/// Lightweight description of the discount applied to a listing price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountInfo {
    /// Display name of the discount.
    pub name: String,
    /// Percentage points for percent kinds, currency amount otherwise.
    pub value: f64,
    /// Kind tag.
    pub kind: DiscountType,
    /// Tie-break rank the discount carried.
    pub priority: i32,
}

impl DiscountInfo {
    /// Summarize a discount for display.
    pub fn from_discount(discount: &Discount) -> Self {
        let value = match discount.kind {
            DiscountKind::Percent { rate } => rate,
            DiscountKind::Quantity { rate, .. } => rate,
            DiscountKind::Fixed { amount } | DiscountKind::Holiday { amount } => {
                amount.to_decimal()
            }
        };
        Self {
            name: discount.name.clone(),
            value,
            kind: discount.kind.discount_type(),
            priority: discount.priority,
        }
    }
}

/// Result of listing resolution for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingQuote {
    /// Price to show. Never above the base price, never below zero.
    pub final_price: Money,
    /// The winning discount, if any.
    pub applied: Option<DiscountInfo>,
}

impl ListingQuote {
    /// A quote at the original price.
    pub fn undiscounted(price: Money) -> Self {
        Self {
            final_price: price,
            applied: None,
        }
    }

    /// Check if a discount changed the price.
    pub fn is_discounted(&self) -> bool {
        self.applied.is_some()
    }
}

/// Resolve the price a listing page shows for one product.
///
/// Only percent discounts are eligible here; flat and quantity-gated
/// kinds never touch a listing price. Among applicable candidates the
/// lowest resulting price wins; ties prefer the lower priority value.
/// No applicable candidate leaves the base price untouched.
pub fn resolve_listing_price(
    product_id: &ProductId,
    base_price: Money,
    candidates: &[Discount],
) -> ListingQuote {
    let mut winner: Option<(Money, &Discount)> = None;

    for discount in candidates {
        let rate = match discount.kind {
            DiscountKind::Percent { rate } => rate,
            _ => continue,
        };
        if !discount.applies_to(product_id) {
            continue;
        }

        let candidate = base_price.sub_to_zero(&base_price.percentage(rate));
        let better = match &winner {
            None => true,
            Some((best_price, best)) => {
                candidate.amount_cents < best_price.amount_cents
                    || (candidate.amount_cents == best_price.amount_cents
                        && discount.priority < best.priority)
            }
        };
        if better {
            winner = Some((candidate, discount));
        }
    }

    match winner {
        Some((final_price, discount)) => ListingQuote {
            final_price,
            applied: Some(DiscountInfo::from_discount(discount)),
        },
        None => ListingQuote::undiscounted(base_price),
    }
}

/// Resolve listing prices for a whole page of products.
pub fn resolve_listing_prices(products: &[Product], candidates: &[Discount]) -> Vec<ListingQuote> {
    products
        .iter()
        .map(|p| resolve_listing_price(&p.id, p.price, candidates))
        .collect()
}

impl Product {
    /// Listing quote for this product against the given candidates.
    pub fn listing_quote(&self, candidates: &[Discount]) -> ListingQuote {
        resolve_listing_price(&self.id, self.price, candidates)
    }
}

/// Result of checkout resolution for a whole cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResolution {
    /// Amount subtracted from the cart total. Zero when nothing applied.
    pub discount_amount: Money,
    /// The winning discount, if any.
    pub discount: Option<Discount>,
    /// Cart total after the discount, floored at zero.
    pub final_price: Money,
}

impl CheckoutResolution {
    /// A resolution that leaves the total untouched.
    pub fn none(total: Money) -> Self {
        Self {
            discount_amount: Money::zero(total.currency),
            discount: None,
            final_price: total,
        }
    }

    /// Check if a discount was applied.
    pub fn has_discount(&self) -> bool {
        self.discount.is_some()
    }
}

/// Resolve the single discount applied to a cart at checkout.
///
/// Every kind competes. Each candidate is reduced to one cart-wide
/// amount; the largest positive amount wins and ties prefer the higher
/// priority value. Discounts never stack. When no candidate produces a
/// positive amount the total passes through unchanged.
pub fn resolve_checkout_discount(
    items: &[CartItem],
    total_amount: Money,
    total_quantity: i64,
    candidates: &[Discount],
) -> CheckoutResolution {
    let mut winner: Option<(Money, &Discount)> = None;

    for discount in candidates {
        let amount = checkout_amount(discount, items, total_amount, total_quantity);
        if !amount.is_positive() {
            continue;
        }

        let better = match &winner {
            None => true,
            Some((best_amount, best)) => {
                amount.amount_cents > best_amount.amount_cents
                    || (amount.amount_cents == best_amount.amount_cents
                        && discount.priority > best.priority)
            }
        };
        if better {
            winner = Some((amount, discount));
        }
    }

    match winner {
        Some((discount_amount, discount)) => CheckoutResolution {
            discount_amount,
            final_price: total_amount.sub_to_zero(&discount_amount),
            discount: Some(discount.clone()),
        },
        None => CheckoutResolution::none(total_amount),
    }
}

/// Reduce one candidate to a single cart-wide amount.
///
/// A candidate restricted to products absent from the cart contributes
/// zero, as does a flat amount in the wrong currency (logged, treated
/// as inapplicable) and a quantity kind whose gate is not met.
fn checkout_amount(
    discount: &Discount,
    items: &[CartItem],
    total_amount: Money,
    total_quantity: i64,
) -> Money {
    if !discount.applies_to_any(items.iter().map(|item| &item.product_id)) {
        return Money::zero(total_amount.currency);
    }

    match discount.kind {
        DiscountKind::Percent { rate } => total_amount.percentage(rate),
        DiscountKind::Quantity { rate, min_quantity } => {
            if total_quantity >= min_quantity {
                total_amount.percentage(rate)
            } else {
                Money::zero(total_amount.currency)
            }
        }
        DiscountKind::Fixed { amount } | DiscountKind::Holiday { amount } => {
            if amount.currency == total_amount.currency {
                amount
            } else {
                tracing::warn!(
                    discount = %discount.name,
                    expected = %total_amount.currency,
                    got = %amount.currency,
                    "flat discount currency mismatches cart, treated as inapplicable"
                );
                Money::zero(total_amount.currency)
            }
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::money::Currency;
    use proptest::prelude::*;

    fn arb_discount() -> impl Strategy<Value = Discount> {
        let kind = prop_oneof![
            (0.0f64..200.0).prop_map(|rate| DiscountKind::Percent { rate }),
            (0i64..2_000_000).prop_map(|a| DiscountKind::Fixed {
                amount: Money::new(a, Currency::VND),
            }),
            ((0.0f64..200.0), (0i64..10)).prop_map(|(rate, min_quantity)| {
                DiscountKind::Quantity { rate, min_quantity }
            }),
            (0i64..2_000_000).prop_map(|a| DiscountKind::Holiday {
                amount: Money::new(a, Currency::VND),
            }),
        ];
        (kind, -10i32..10).prop_map(|(kind, priority)| {
            let mut discount = Discount::percent("p", 0.0).with_priority(priority);
            discount.kind = kind;
            discount
        })
    }

    proptest! {
        #[test]
        fn listing_price_stays_within_bounds(
            base in 0i64..10_000_000,
            candidates in proptest::collection::vec(arb_discount(), 0..8),
        ) {
            let base_price = Money::new(base, Currency::VND);
            let quote =
                resolve_listing_price(&ProductId::new("prod-1"), base_price, &candidates);

            prop_assert!(quote.final_price.amount_cents >= 0);
            prop_assert!(quote.final_price.amount_cents <= base);
        }

        #[test]
        fn listing_only_applies_percent(
            base in 1i64..10_000_000,
            candidates in proptest::collection::vec(arb_discount(), 0..8),
        ) {
            let base_price = Money::new(base, Currency::VND);
            let quote =
                resolve_listing_price(&ProductId::new("prod-1"), base_price, &candidates);

            if let Some(applied) = quote.applied {
                prop_assert_eq!(applied.kind, DiscountType::Percent);
            }
        }

        #[test]
        fn checkout_price_never_negative(
            total in 0i64..10_000_000,
            quantity in 0i64..50,
            candidates in proptest::collection::vec(arb_discount(), 0..8),
        ) {
            let items = vec![CartItem::new(
                ProductId::new("prod-1"),
                "Đen",
                "M",
                quantity.max(1),
                Money::new(1000, Currency::VND),
            )
            .unwrap()];
            let total_amount = Money::new(total, Currency::VND);
            let resolution =
                resolve_checkout_discount(&items, total_amount, quantity, &candidates);

            prop_assert!(resolution.final_price.amount_cents >= 0);
            prop_assert!(resolution.final_price.amount_cents <= total);
            if resolution.discount.is_none() {
                prop_assert_eq!(resolution.final_price.amount_cents, total);
            }
        }
    }
}
