use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use botica_core::{AggregateId, AggregateRoot, DomainError, DomainResult};
use botica_parties::CustomerId;
use botica_products::{Product, ProductId};

/// Sales order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle: Pending → {Completed, Cancelled}, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Order line with the product's code, name, and price snapshotted at
/// order-creation time; never looked up live afterwards, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    /// Price in smallest currency unit, snapshotted.
    pub unit_price: u64,
    pub quantity: u32,
    /// `unit_price * quantity`, fixed at creation.
    pub subtotal: u64,
}

impl OrderItem {
    /// Snapshot a product into an order line.
    ///
    /// Fails with `InvalidArgument` for a zero quantity. Availability and
    /// stock-sufficiency checks belong to the workflow.
    pub fn snapshot(product: &Product, quantity: u32) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::invalid_argument("quantity must be positive"));
        }

        Ok(Self {
            product_id: product.id_typed(),
            sku: product.sku().to_string(),
            name: product.name().to_string(),
            unit_price: product.unit_price(),
            quantity,
            subtotal: product.unit_price() * u64::from(quantity),
        })
    }
}

/// Aggregate root: Order.
///
/// Invariant: `total` always equals the sum of the item subtotals; items are
/// immutable once the order is created. Transitions are pure and return the
/// next state; the workflow stages it for the transaction to commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    number: String,
    customer_id: CustomerId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    /// Sum of item subtotals, in smallest currency unit.
    total: u64,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    version: u64,
}

impl Order {
    /// Create a pending order from snapshotted items.
    ///
    /// Fails with `BusinessRule` when `items` is empty.
    pub fn create(
        id: OrderId,
        number: impl Into<String>,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::business_rule(
                "order must contain at least one item",
            ));
        }

        let total = items.iter().map(|item| item.subtotal).sum();

        Ok(Self {
            id,
            number: number.into(),
            customer_id,
            status: OrderStatus::Pending,
            items,
            total,
            created_at: at,
            delivered_at: None,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Mark the order completed, recording the actual delivery time.
    ///
    /// Requires a pending order with at least one item and a positive total;
    /// anything else fails with `InvalidState`. No stock or credit side
    /// effects; those already happened at creation.
    pub fn complete(&self, at: DateTime<Utc>) -> DomainResult<Self> {
        if self.status != OrderStatus::Pending || self.items.is_empty() || self.total == 0 {
            return Err(DomainError::invalid_state(format!(
                "cannot complete order {} in status {:?}",
                self.number, self.status
            )));
        }

        let mut next = self.clone();
        next.status = OrderStatus::Completed;
        next.delivered_at = Some(at);
        next.version += 1;
        Ok(next)
    }

    /// Mark the order cancelled.
    ///
    /// Only pending orders transition; a completed order fails with
    /// `InvalidState` and an already-cancelled order is returned unchanged.
    /// The stock/credit reversal is the workflow's job and happens strictly
    /// before this transition, strictly when the order is still pending.
    pub fn cancel(&self) -> DomainResult<Self> {
        match self.status {
            OrderStatus::Pending => {
                let mut next = self.clone();
                next.status = OrderStatus::Cancelled;
                next.version += 1;
                Ok(next)
            }
            OrderStatus::Cancelled => Ok(self.clone()),
            OrderStatus::Completed => Err(DomainError::invalid_state(format!(
                "cannot cancel completed order {}",
                self.number
            ))),
        }
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order_id() -> OrderId {
        OrderId::new(AggregateId::new())
    }

    fn test_customer_id() -> CustomerId {
        CustomerId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_product(sku: &str, unit_price: u64, stock: u32) -> Product {
        Product::new(
            botica_products::ProductId::new(AggregateId::new()),
            sku,
            format!("Product {sku}"),
            unit_price,
            stock,
            0,
            test_time(),
        )
        .unwrap()
    }

    fn test_order() -> Order {
        let p1 = test_product("SKU-001", 100, 50);
        let p2 = test_product("SKU-002", 250, 50);
        Order::create(
            test_order_id(),
            "ORD-20250101-000001",
            test_customer_id(),
            vec![
                OrderItem::snapshot(&p1, 3).unwrap(),
                OrderItem::snapshot(&p2, 2).unwrap(),
            ],
            test_time(),
        )
        .unwrap()
    }

    #[test]
    fn total_is_sum_of_item_subtotals() {
        let order = test_order();
        assert_eq!(order.total(), 3 * 100 + 2 * 250);
        assert_eq!(
            order.total(),
            order.items().iter().map(|i| i.subtotal).sum::<u64>()
        );
        for item in order.items() {
            assert_eq!(item.subtotal, item.unit_price * u64::from(item.quantity));
        }
    }

    #[test]
    fn create_rejects_empty_items() {
        let err = Order::create(
            test_order_id(),
            "ORD-1",
            test_customer_id(),
            vec![],
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::BusinessRule(_)));
    }

    #[test]
    fn snapshot_rejects_zero_quantity() {
        let product = test_product("SKU-001", 100, 50);
        let err = OrderItem::snapshot(&product, 0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn complete_sets_status_and_delivery_time() {
        let order = test_order();
        let at = test_time();

        let completed = order.complete(at).unwrap();
        assert_eq!(completed.status(), OrderStatus::Completed);
        assert_eq!(completed.delivered_at(), Some(at));
    }

    #[test]
    fn complete_rejects_non_pending_order() {
        let order = test_order();
        let completed = order.complete(test_time()).unwrap();

        let err = completed.complete(test_time()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn cancel_rejects_completed_order() {
        let order = test_order();
        let completed = order.complete(test_time()).unwrap();

        let err = completed.cancel().unwrap_err();
        match err {
            DomainError::InvalidState(msg) if msg.contains("cannot cancel completed") => {}
            _ => panic!("Expected InvalidState for cancelling a completed order"),
        }
    }

    #[test]
    fn cancel_is_idempotent_on_cancelled_order() {
        let order = test_order();
        let cancelled = order.cancel().unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);

        let again = cancelled.cancel().unwrap();
        assert_eq!(again, cancelled);
    }

    #[test]
    fn statuses_serialize_with_api_spellings() {
        assert_eq!(
            serde_json::to_value(OrderStatus::Pending).unwrap(),
            serde_json::json!("PENDING")
        );
        assert_eq!(
            serde_json::to_value(OrderStatus::Cancelled).unwrap(),
            serde_json::json!("CANCELLED")
        );
    }
}
