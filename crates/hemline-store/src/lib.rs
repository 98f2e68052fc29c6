//! In-memory store backends for the Hemline storefront engines.
//!
//! Each backend guards a plain map with an `RwLock`, which is what
//! makes [`MemoryProductStore`]'s stock decrement atomic: lookup, clamp
//! and write happen under one write guard, so concurrent fulfillment
//! passes over the same counter serialize instead of losing updates.
//!
//! Suitable for tests and single-process deployments. Anything shared
//! across processes wants its own implementation of the
//! `hemline_commerce::store` contracts.

mod discounts;
mod orders;
mod products;

pub use discounts::MemoryDiscountCatalog;
pub use orders::MemoryOrderStore;
pub use products::MemoryProductStore;
