//! Promotions module.
//!
//! Contains the discount model, admin drafts, and the two
//! context-specific resolution policies.

mod discount;
mod resolution;

pub use discount::{Discount, DiscountDraft, DiscountKind, DiscountType};
pub use resolution::{
    resolve_checkout_discount, resolve_listing_price, resolve_listing_prices, CheckoutResolution,
    DiscountInfo, ListingQuote,
};
