//! Order types.

use crate::cart::{Cart, CartItem};
use crate::catalog::StockKey;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use crate::promo::CheckoutResolution;
use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order placed, awaiting confirmation.
    #[default]
    Pending,
    /// Order confirmed and being prepared.
    Confirmed,
    /// Order handed to the carrier.
    Shipping,
    /// Order delivered and closed.
    Completed,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipping => "Shipping",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Check if the order can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}

/// Payment status. Carried on the order; written by the payment
/// collaborator, never by the fulfillment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Payment not yet captured.
    #[default]
    Unpaid,
    /// Payment captured.
    Paid,
    /// Payment returned to the customer.
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// A placed order.
///
/// Created from a cart at checkout and mutated only through the
/// fulfillment engine once placed. Terminal orders change no further
/// except audit fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Customer who placed the order.
    pub user_id: UserId,
    /// Items in the order.
    pub items: Vec<OrderItem>,
    /// Sum of line subtotals at the prices charged.
    pub subtotal_price: Money,
    /// Cart-level discount applied at checkout.
    pub discount_amount: Money,
    /// Amount charged (subtotal minus discount, floored at zero).
    pub total_price: Money,
    /// Order status.
    pub status: OrderStatus,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Unix timestamp when cancelled (if applicable).
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Convert a cart into a pending order at checkout.
    ///
    /// Each line is charged at its sale price; the checkout resolution
    /// supplies the single cart-level discount. The resolution is
    /// expected to come from a quote over this same cart. An empty cart
    /// is rejected.
    pub fn place(
        user_id: UserId,
        cart: &Cart,
        resolution: &CheckoutResolution,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        if resolution.discount_amount.currency != cart.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: cart.currency.code().to_string(),
                got: resolution.discount_amount.currency.code().to_string(),
            });
        }

        let items = cart
            .items
            .iter()
            .map(OrderItem::from_cart_line)
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal_price = Money::try_sum(items.iter().map(|i| &i.subtotal), cart.currency)
            .ok_or(CommerceError::Overflow)?;
        let total_price = subtotal_price.sub_to_zero(&resolution.discount_amount);

        let now = current_timestamp();
        Ok(Self {
            id: OrderId::generate(),
            user_id,
            items,
            subtotal_price,
            discount_amount: resolution.discount_amount,
            total_price,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        })
    }

    /// Get total unit count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if payment has been captured.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// A line in an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product ordered.
    pub product_id: ProductId,
    /// Variant color.
    pub color: String,
    /// Size label.
    pub size: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Price per unit actually charged.
    pub unit_price: Money,
    /// Line total (unit_price * quantity).
    pub subtotal: Money,
}

impl OrderItem {
    /// Create an order line.
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
            subtotal,
        })
    }

    /// Freeze a cart line at its sale price.
    pub fn from_cart_line(line: &CartItem) -> Result<Self, CommerceError> {
        Self::new(
            line.product_id.clone(),
            line.color.clone(),
            line.size.clone(),
            line.quantity,
            line.sale_price,
        )
    }

    /// The stock counter this line draws from.
    pub fn stock_key(&self) -> StockKey {
        StockKey::new(self.product_id.clone(), &self.color, &self.size)
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
