//! Product catalog module.
//!
//! Contains the product/variant/size stock tree and the stock
//! adjustment primitives shared by the fulfillment engine and stores.

mod product;
mod stock;

pub use product::{Product, SizeStock, Variant};
pub use stock::{decrement_size, AdjustmentOutcome, StockAdjustment, StockKey};
