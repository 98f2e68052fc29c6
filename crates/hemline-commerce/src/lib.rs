//! Storefront domain types and logic for Hemline.
//!
//! This crate provides the core engines of an apparel storefront:
//!
//! - **Catalog**: Products, color variants, per-size stock counters
//! - **Promo**: Discounts and the listing/checkout resolution policies
//! - **Cart**: Shopping cart with line items and the pricing aggregator
//! - **Orders**: Order aggregate, status lifecycle, fulfillment engine
//! - **Store**: Repository contracts the engines run against
//!
//! # Example
//!
//! ```rust,ignore
//! use hemline_commerce::prelude::*;
//!
//! // Create a product with a stocked variant
//! let product = Product::new("Oxford Shirt", category_id, Money::new(350000, Currency::VND))
//!     .with_variant(Variant::new("Đen").with_size("M", 20));
//!
//! // Resolve the price a visitor sees on the listing page
//! let quote = resolve_listing_price(&product.id, product.price, &discounts);
//! println!("On sale: {}", quote.final_price.display());
//!
//! // Build a cart and apply the sale prices to its lines
//! let mut cart = Cart::new(user_id);
//! cart.add_item(product.id.clone(), "Đen", "M", 2, product.price)?;
//! cart.reprice(&discounts);
//!
//! // Resolve the single checkout discount and place the order
//! let totals = cart.totals()?;
//! let resolution =
//!     resolve_checkout_discount(&cart.items, totals.sale_subtotal, cart.item_count(), &discounts);
//! let order = Order::place(cart.user_id.clone(), &cart, &resolution)?;
//!
//! // Ship it; stock is decremented through the product store
//! let change = engine.set_status(order, OrderStatus::Shipping)?;
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod promo;
pub mod store;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        AdjustmentOutcome, Product, SizeStock, StockAdjustment, StockKey, Variant,
    };

    // Promo
    pub use crate::promo::{
        resolve_checkout_discount, resolve_listing_price, CheckoutResolution, Discount,
        DiscountDraft, DiscountKind, DiscountType, ListingQuote,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem, CartQuote, CartTotals};

    // Orders
    pub use crate::orders::{
        FulfillmentEngine, Order, OrderItem, OrderStatus, PaymentStatus, StatusChange,
    };

    // Store contracts
    pub use crate::store::{DiscountCatalog, OrderStore, ProductStore};
}
