//! Order workflow: creation, completion, and cancellation.
//!
//! Every operation runs inside one unit-of-work obtained from the injected
//! store: reads go through the transaction (read-your-writes), pure
//! next-states are staged, and `commit` applies everything atomically with
//! optimistic version checks. Any failure before commit discards the
//! transaction, so no partial stock or balance mutation is ever retained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use botica_core::{AggregateId, DomainError, DomainResult, ReferenceSource};
use botica_parties::{Customer, CustomerId};
use botica_products::{Product, ProductId};

use crate::order::{Order, OrderId, OrderItem};

/// Unit-of-work over the aggregates the order workflow touches.
///
/// Reads must reflect writes staged earlier in the same transaction, and
/// they record the version observed at first read so `commit` can detect
/// concurrent modification. Dropping the transaction without `commit`
/// discards all staged writes.
pub trait SalesTx {
    fn customer(&mut self, id: CustomerId) -> DomainResult<Customer>;
    fn product(&mut self, id: ProductId) -> DomainResult<Product>;
    fn order(&mut self, id: OrderId) -> DomainResult<Order>;

    fn stage_customer(&mut self, customer: Customer);
    fn stage_product(&mut self, product: Product);
    fn stage_order(&mut self, order: Order);

    /// Apply all staged writes atomically.
    ///
    /// Fails with `Conflict` if any aggregate read in this transaction was
    /// modified underneath it; nothing is applied in that case.
    fn commit(self) -> DomainResult<()>;
}

/// Opens unit-of-work transactions for the order workflow.
pub trait SalesStore {
    type Tx: SalesTx;

    fn begin(&self) -> Self::Tx;
}

/// A requested order line: which product, how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Command: create an order for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub customer_id: CustomerId,
    pub items: Vec<OrderLineRequest>,
    pub occurred_at: DateTime<Utc>,
}

/// Orchestrates order creation, completion, and cancellation against the
/// stock and credit ledgers.
#[derive(Debug)]
pub struct OrderWorkflow<S, R> {
    store: S,
    refs: R,
}

impl<S, R> OrderWorkflow<S, R> {
    pub fn new(store: S, refs: R) -> Self {
        Self { store, refs }
    }
}

impl<S, R> OrderWorkflow<S, R>
where
    S: SalesStore,
    R: ReferenceSource,
{
    /// Create an order: validate customer, stock, and credit; snapshot the
    /// items; then debit stock per item and credit the balance, all in one
    /// transaction.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id))]
    pub fn create_order(&self, cmd: CreateOrder) -> DomainResult<Order> {
        let mut tx = self.store.begin();

        let customer = tx.customer(cmd.customer_id)?;
        if !customer.is_active() {
            return Err(DomainError::business_rule(format!(
                "customer {} is not active",
                customer.code()
            )));
        }

        if cmd.items.is_empty() {
            return Err(DomainError::business_rule(
                "order must contain at least one item",
            ));
        }

        let mut items = Vec::with_capacity(cmd.items.len());
        for line in &cmd.items {
            let product = tx.product(line.product_id)?;
            if !product.is_available() {
                return Err(DomainError::business_rule(format!(
                    "product {} is not available",
                    product.sku()
                )));
            }
            if line.quantity > product.stock() {
                return Err(DomainError::business_rule(format!(
                    "insufficient stock for product {}: requested {}, available {}",
                    product.sku(),
                    line.quantity,
                    product.stock()
                )));
            }
            items.push(OrderItem::snapshot(&product, line.quantity)?);
        }

        let order = Order::create(
            OrderId::new(AggregateId::new()),
            self.refs.next_reference("ORD"),
            cmd.customer_id,
            items,
            cmd.occurred_at,
        )?;

        if !customer.has_credit_available(order.total()) {
            return Err(DomainError::business_rule(format!(
                "insufficient credit for customer {}: order total {}, available {}",
                customer.code(),
                order.total(),
                customer.available_credit()
            )));
        }

        tx.stage_order(order.clone());

        // Deterministic side-effect order: stock per item, then the balance.
        for item in order.items() {
            let product = tx.product(item.product_id)?;
            tx.stage_product(product.decrease_stock(item.quantity, cmd.occurred_at)?);
        }
        tx.stage_customer(customer.increase_balance(order.total(), cmd.occurred_at)?);

        tx.commit()?;

        info!(
            order = %order.number(),
            total = order.total(),
            items = order.items().len(),
            "order created"
        );
        Ok(order)
    }

    /// Complete a pending order. No ledger side effects; those already
    /// happened at creation.
    #[tracing::instrument(skip(self), fields(order_id = %order_id))]
    pub fn complete_order(
        &self,
        order_id: OrderId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Order> {
        let mut tx = self.store.begin();

        let order = tx.order(order_id)?;
        let completed = order.complete(occurred_at)?;

        tx.stage_order(completed.clone());
        tx.commit()?;

        info!(order = %completed.number(), "order completed");
        Ok(completed)
    }

    /// Cancel an order, reversing the creation-time ledger effects.
    ///
    /// Reversal fires strictly when the order is still pending; cancelling
    /// an already-cancelled order is an idempotent no-op (never a second
    /// reversal), and a completed order cannot be cancelled at all.
    #[tracing::instrument(skip(self), fields(order_id = %order_id))]
    pub fn cancel_order(
        &self,
        order_id: OrderId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Order> {
        let mut tx = self.store.begin();

        let order = tx.order(order_id)?;
        if !order.is_pending() {
            // Completed → InvalidState; Cancelled → unchanged, no reversal.
            return order.cancel();
        }

        let cancelled = order.cancel()?;

        for item in order.items() {
            let product = tx.product(item.product_id)?;
            tx.stage_product(product.increase_stock(item.quantity, occurred_at)?);
        }
        let customer = tx.customer(order.customer_id())?;
        tx.stage_customer(customer.decrease_balance(order.total(), occurred_at)?);
        tx.stage_order(cancelled.clone());

        tx.commit()?;

        info!(order = %cancelled.number(), total = order.total(), "order cancelled");
        Ok(cancelled)
    }
}
