//! Order status state machine and stock adjustment engine.
//!
//! The engine is the sole writer of an order's status and the sole
//! trigger of stock mutation. Transitions move forward only; inventory
//! is decremented through the product store's atomic operation, one
//! line at a time, and a bad line never blocks the rest.

use crate::catalog::{AdjustmentOutcome, StockAdjustment};
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::orders::{Order, OrderItem, OrderStatus};
use crate::store::{OrderStore, ProductStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

impl OrderStatus {
    /// Position in the forward lifecycle.
    fn sequence(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Shipping => 2,
            OrderStatus::Completed => 3,
            // Terminal, outside the forward path.
            OrderStatus::Cancelled => 4,
        }
    }

    /// Check whether a status-set operation from this status to
    /// `target` is legal.
    ///
    /// The lifecycle is `Pending -> Confirmed -> Shipping -> Completed`
    /// with forward jumps allowed and `Cancelled` reachable until the
    /// order ships. Re-issuing the current status of a non-terminal
    /// order is legal; terminal orders accept nothing further.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if target == OrderStatus::Cancelled {
            return self.can_cancel();
        }
        target.sequence() >= self.sequence()
    }

    /// Check whether moving from this status to `target` runs the
    /// stock adjustment pass.
    ///
    /// Inventory is decremented on entry into `Shipping` and,
    /// independently, on entry into `Completed`. A full
    /// `Pending -> Shipping -> Completed` traversal therefore
    /// decrements twice for the same item list; a jump straight to
    /// `Completed` decrements once. Re-issuing the current status never
    /// decrements.
    pub fn triggers_stock_adjustment(&self, target: OrderStatus) -> bool {
        (target == OrderStatus::Shipping && *self != OrderStatus::Shipping)
            || (target == OrderStatus::Completed && *self != OrderStatus::Completed)
    }
}

/// Outcome of a status-set operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusChange {
    /// The order as persisted, carrying the new status.
    pub order: Order,
    /// Status before the operation.
    pub previous: OrderStatus,
    /// Whether the stock adjustment pass ran for this transition. Per-
    /// line results, including skips, are in `adjustments`.
    pub stock_adjusted: bool,
    /// One record per order line when the pass ran, in order.
    pub adjustments: Vec<StockAdjustment>,
}

/// Moves orders through their lifecycle and adjusts inventory.
///
/// Stock is decremented through [`ProductStore::decrement_stock`] so
/// concurrent transitions over the same counter serialize in the store
/// instead of racing a read-modify-write. Lines that reference a
/// missing product, variant or size are skipped and logged, never
/// raised; the order's contents and inventory can therefore diverge
/// silently, which callers accept in exchange for fulfillment never
/// blocking on one bad line.
#[derive(Clone)]
pub struct FulfillmentEngine {
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
}

impl FulfillmentEngine {
    /// Create an engine over the given stores.
    pub fn new(products: Arc<dyn ProductStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { products, orders }
    }

    /// Set an order's status, adjusting stock when the transition
    /// calls for it.
    ///
    /// Rejects illegal transitions. Once the transition is accepted the
    /// new status is persisted unconditionally, even if some stock
    /// lines were skipped or failed; inspect
    /// [`StatusChange::adjustments`] for the per-line record.
    pub fn set_status(
        &self,
        mut order: Order,
        target: OrderStatus,
    ) -> Result<StatusChange, CommerceError> {
        let previous = order.status;
        if !previous.can_transition_to(target) {
            return Err(CommerceError::InvalidStatusTransition {
                from: previous.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        let stock_adjusted = previous.triggers_stock_adjustment(target);
        let adjustments = if stock_adjusted {
            debug!(
                order = %order.id,
                from = previous.as_str(),
                to = target.as_str(),
                "adjusting stock for status transition"
            );
            self.adjust_stock(&order.items)
        } else {
            Vec::new()
        };

        let now = current_timestamp();
        order.status = target;
        order.updated_at = now;
        if target == OrderStatus::Cancelled {
            order.cancelled_at = Some(now);
        }
        self.orders.save_order(order.clone())?;

        Ok(StatusChange {
            order,
            previous,
            stock_adjusted,
            adjustments,
        })
    }

    /// Resolve an order through the order store and set its status.
    pub fn set_status_by_id(
        &self,
        order_id: &OrderId,
        target: OrderStatus,
    ) -> Result<StatusChange, CommerceError> {
        let order = self
            .orders
            .order(order_id)?
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;
        self.set_status(order, target)
    }

    /// Decrement stock for every line, sequentially and independently.
    ///
    /// Missing products, variants or sizes are skipped; store failures
    /// are swallowed into [`AdjustmentOutcome::Failed`]. Either way the
    /// remaining lines still run.
    pub fn adjust_stock(&self, items: &[OrderItem]) -> Vec<StockAdjustment> {
        items
            .iter()
            .map(|item| {
                let key = item.stock_key();
                let outcome = match self.products.decrement_stock(&key, item.quantity) {
                    Ok(outcome) => {
                        if outcome.is_skipped() {
                            warn!(key = %key, outcome = ?outcome, "stock line skipped");
                        }
                        outcome
                    }
                    Err(e) => {
                        error!(key = %key, "stock decrement failed: {e}");
                        AdjustmentOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                StockAdjustment {
                    product_id: key.product_id,
                    color: key.color,
                    size: key.size,
                    quantity: item.quantity,
                    outcome,
                }
            })
            .collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{decrement_size, Product, StockKey, Variant};
    use crate::ids::{CategoryId, ProductId, UserId};
    use crate::money::{Currency, Money};
    use crate::orders::PaymentStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use OrderStatus::*;

    #[derive(Default)]
    struct MapProductStore {
        products: Mutex<HashMap<ProductId, Product>>,
    }

    impl ProductStore for MapProductStore {
        fn product(&self, id: &ProductId) -> Result<Option<Product>, CommerceError> {
            Ok(self.products.lock().unwrap().get(id).cloned())
        }

        fn save_product(&self, product: Product) -> Result<(), CommerceError> {
            self.products
                .lock()
                .unwrap()
                .insert(product.id.clone(), product);
            Ok(())
        }

        fn decrement_stock(
            &self,
            key: &StockKey,
            quantity: i64,
        ) -> Result<AdjustmentOutcome, CommerceError> {
            let mut products = self.products.lock().unwrap();
            match products.get_mut(&key.product_id) {
                Some(product) => Ok(decrement_size(product, &key.color, &key.size, quantity)),
                None => Ok(AdjustmentOutcome::SkippedMissingProduct),
            }
        }
    }

    #[derive(Default)]
    struct MapOrderStore {
        orders: Mutex<HashMap<OrderId, Order>>,
    }

    impl OrderStore for MapOrderStore {
        fn order(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
            Ok(self.orders.lock().unwrap().get(id).cloned())
        }

        fn save_order(&self, order: Order) -> Result<(), CommerceError> {
            self.orders.lock().unwrap().insert(order.id.clone(), order);
            Ok(())
        }
    }

    /// Product store whose backend is down.
    struct FailingProductStore;

    impl ProductStore for FailingProductStore {
        fn product(&self, _id: &ProductId) -> Result<Option<Product>, CommerceError> {
            Err(CommerceError::StorageError("backend down".into()))
        }

        fn save_product(&self, _product: Product) -> Result<(), CommerceError> {
            Err(CommerceError::StorageError("backend down".into()))
        }

        fn decrement_stock(
            &self,
            _key: &StockKey,
            _quantity: i64,
        ) -> Result<AdjustmentOutcome, CommerceError> {
            Err(CommerceError::StorageError("backend down".into()))
        }
    }

    fn vnd(amount: i64) -> Money {
        Money::new(amount, Currency::VND)
    }

    fn shirt(id: &str, stock: i64) -> Product {
        let mut product = Product::new(
            "Oxford Shirt",
            CategoryId::new("cat-shirts"),
            vnd(350000),
        )
        .with_variant(Variant::new("Đen").with_size("M", stock));
        product.id = ProductId::new(id);
        product
    }

    fn order_for(product: &str, quantity: i64) -> Order {
        let item = OrderItem::new(ProductId::new(product), "Đen", "M", quantity, vnd(350000))
            .unwrap();
        let subtotal = item.subtotal;
        Order {
            id: OrderId::generate(),
            user_id: UserId::new("user-7"),
            items: vec![item],
            subtotal_price: subtotal,
            discount_amount: vnd(0),
            total_price: subtotal,
            status: Pending,
            payment_status: PaymentStatus::Unpaid,
            created_at: 0,
            updated_at: 0,
            cancelled_at: None,
        }
    }

    fn engine_with(products: Vec<Product>) -> (FulfillmentEngine, Arc<MapProductStore>) {
        let store = Arc::new(MapProductStore::default());
        for product in products {
            store.save_product(product).unwrap();
        }
        let engine = FulfillmentEngine::new(store.clone(), Arc::new(MapOrderStore::default()));
        (engine, store)
    }

    fn stock_of(store: &MapProductStore, product: &str) -> i64 {
        store
            .product(&ProductId::new(product))
            .unwrap()
            .unwrap()
            .total_stock()
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Shipping));
        assert!(Shipping.can_transition_to(Completed));
        // Jumps over intermediate states.
        assert!(Pending.can_transition_to(Shipping));
        assert!(Pending.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Completed));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Shipping.can_transition_to(Confirmed));
        assert!(!Shipping.can_transition_to(Pending));
    }

    #[test]
    fn test_same_status_reissue_allowed_until_terminal() {
        assert!(Pending.can_transition_to(Pending));
        assert!(Shipping.can_transition_to(Shipping));
        assert!(!Completed.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_cancellation_window() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Shipping.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for target in [Pending, Confirmed, Shipping, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(target));
            assert!(!Cancelled.can_transition_to(target));
        }
    }

    #[test]
    fn test_stock_trigger_rule() {
        assert!(Pending.triggers_stock_adjustment(Shipping));
        assert!(Confirmed.triggers_stock_adjustment(Shipping));
        assert!(Pending.triggers_stock_adjustment(Completed));
        // Entry into Completed fires even from Shipping.
        assert!(Shipping.triggers_stock_adjustment(Completed));
        // Re-issues and non-fulfillment targets do not fire.
        assert!(!Shipping.triggers_stock_adjustment(Shipping));
        assert!(!Pending.triggers_stock_adjustment(Confirmed));
        assert!(!Pending.triggers_stock_adjustment(Cancelled));
    }

    #[test]
    fn test_shipping_decrements_stock() {
        let (engine, store) = engine_with(vec![shirt("prod-1", 20)]);
        let order = order_for("prod-1", 5);

        let change = engine.set_status(order, Shipping).unwrap();
        assert!(change.stock_adjusted);
        assert_eq!(change.previous, Pending);
        assert_eq!(change.order.status, Shipping);
        assert_eq!(
            change.adjustments[0].outcome,
            AdjustmentOutcome::Applied {
                previous: 20,
                remaining: 15,
            }
        );
        assert_eq!(stock_of(&store, "prod-1"), 15);
    }

    #[test]
    fn test_reissue_is_stock_noop() {
        let (engine, store) = engine_with(vec![shirt("prod-1", 20)]);
        let order = order_for("prod-1", 5);

        let change = engine.set_status(order, Shipping).unwrap();
        let change = engine.set_status(change.order, Shipping).unwrap();

        assert!(!change.stock_adjusted);
        assert!(change.adjustments.is_empty());
        assert_eq!(stock_of(&store, "prod-1"), 15);
    }

    #[test]
    fn test_full_traversal_decrements_twice() {
        let (engine, store) = engine_with(vec![shirt("prod-1", 20)]);
        let order = order_for("prod-1", 5);

        let change = engine.set_status(order, Shipping).unwrap();
        assert_eq!(stock_of(&store, "prod-1"), 15);

        // Entry into Completed fires the second, independent condition.
        let change = engine.set_status(change.order, Completed).unwrap();
        assert!(change.stock_adjusted);
        assert_eq!(stock_of(&store, "prod-1"), 10);
    }

    #[test]
    fn test_confirm_does_not_touch_stock() {
        let (engine, store) = engine_with(vec![shirt("prod-1", 20)]);
        let order = order_for("prod-1", 5);

        let change = engine.set_status(order, Confirmed).unwrap();
        assert!(!change.stock_adjusted);
        assert_eq!(stock_of(&store, "prod-1"), 20);
    }

    #[test]
    fn test_cancel_sets_audit_timestamp() {
        let (engine, store) = engine_with(vec![shirt("prod-1", 20)]);
        let order = order_for("prod-1", 5);

        let change = engine.set_status(order, Cancelled).unwrap();
        assert!(!change.stock_adjusted);
        assert!(change.order.cancelled_at.is_some());
        assert_eq!(stock_of(&store, "prod-1"), 20);
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let (engine, store) = engine_with(vec![shirt("prod-1", 20)]);
        let order = order_for("prod-1", 5);

        let change = engine.set_status(order, Completed).unwrap();
        let err = engine.set_status(change.order, Shipping).unwrap_err();

        assert!(matches!(
            err,
            CommerceError::InvalidStatusTransition { .. }
        ));
        // The rejected operation must not have touched inventory again.
        assert_eq!(stock_of(&store, "prod-1"), 15);
    }

    #[test]
    fn test_missing_product_skipped_status_still_set() {
        let (engine, _) = engine_with(vec![]);
        let order = order_for("prod-gone", 5);

        let change = engine.set_status(order, Shipping).unwrap();
        assert!(change.stock_adjusted);
        assert_eq!(
            change.adjustments[0].outcome,
            AdjustmentOutcome::SkippedMissingProduct
        );
        assert_eq!(change.order.status, Shipping);
    }

    #[test]
    fn test_one_bad_line_does_not_block_the_rest() {
        let (engine, store) = engine_with(vec![shirt("prod-1", 20)]);
        let mut order = order_for("prod-1", 5);
        order
            .items
            .push(OrderItem::new(ProductId::new("prod-1"), "Navy", "M", 1, vnd(350000)).unwrap());
        order
            .items
            .push(OrderItem::new(ProductId::new("prod-gone"), "Đen", "M", 1, vnd(350000)).unwrap());

        let change = engine.set_status(order, Shipping).unwrap();
        assert_eq!(change.adjustments.len(), 3);
        assert!(change.adjustments[0].outcome.is_applied());
        assert_eq!(
            change.adjustments[1].outcome,
            AdjustmentOutcome::SkippedMissingVariant
        );
        assert_eq!(
            change.adjustments[2].outcome,
            AdjustmentOutcome::SkippedMissingProduct
        );
        assert_eq!(stock_of(&store, "prod-1"), 15);
    }

    #[test]
    fn test_store_failure_swallowed_status_persisted() {
        let orders = Arc::new(MapOrderStore::default());
        let engine = FulfillmentEngine::new(Arc::new(FailingProductStore), orders.clone());
        let order = order_for("prod-1", 5);
        let order_id = order.id.clone();

        let change = engine.set_status(order, Shipping).unwrap();
        assert!(matches!(
            change.adjustments[0].outcome,
            AdjustmentOutcome::Failed { .. }
        ));

        let persisted = orders.order(&order_id).unwrap().unwrap();
        assert_eq!(persisted.status, Shipping);
    }

    #[test]
    fn test_set_status_by_id() {
        let (engine, _) = engine_with(vec![shirt("prod-1", 20)]);
        let order = order_for("prod-1", 5);
        let order_id = order.id.clone();

        let err = engine.set_status_by_id(&order_id, Confirmed).unwrap_err();
        assert!(matches!(err, CommerceError::OrderNotFound(_)));

        engine.orders.save_order(order).unwrap();
        let change = engine.set_status_by_id(&order_id, Confirmed).unwrap();
        assert_eq!(change.order.status, Confirmed);
    }
}
