//! Order module.
//!
//! Contains the order aggregate, its status lifecycle, and the
//! fulfillment engine that moves orders through it.

mod fulfillment;
mod order;

pub use fulfillment::{FulfillmentEngine, StatusChange};
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
