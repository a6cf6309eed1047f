//! Goods-receipt workflow: creation, confirmation, rejection.
//!
//! Receipts are supply-side: confirming one credits product stock exactly
//! once and never touches customer credit. Like the order workflow, every
//! operation runs inside one unit-of-work and commits atomically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use botica_core::{AggregateId, DomainError, DomainResult, ReferenceSource};
use botica_parties::{Supplier, SupplierId};
use botica_products::{Product, ProductId};
use botica_sales::{Order, OrderId, OrderStatus};

use crate::receipt::{GoodsReceipt, GoodsReceiptId, GoodsReceiptItem};

/// Unit-of-work over the aggregates the receiving workflow touches.
pub trait ReceivingTx {
    fn order(&mut self, id: OrderId) -> DomainResult<Order>;
    fn supplier(&mut self, id: SupplierId) -> DomainResult<Supplier>;
    fn product(&mut self, id: ProductId) -> DomainResult<Product>;
    fn receipt(&mut self, id: GoodsReceiptId) -> DomainResult<GoodsReceipt>;

    /// Whether a fully-received receipt already exists for the order.
    /// Partially-received or rejected receipts do not count.
    fn order_has_received_receipt(&self, order_id: OrderId) -> DomainResult<bool>;

    fn stage_product(&mut self, product: Product);
    fn stage_receipt(&mut self, receipt: GoodsReceipt);

    /// Apply all staged writes atomically; `Conflict` if any aggregate
    /// read in this transaction moved underneath it.
    fn commit(self) -> DomainResult<()>;
}

/// Opens unit-of-work transactions for the receiving workflow.
pub trait ReceivingStore {
    type Tx: ReceivingTx;

    fn begin(&self) -> Self::Tx;
}

/// A reported receipt line: which product, how much actually arrived.
/// The ordered quantity is taken from the order, not from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLineRequest {
    pub product_id: ProductId,
    pub received_quantity: u32,
}

/// Command: register a goods receipt against a completed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGoodsReceipt {
    pub order_id: OrderId,
    pub supplier_id: SupplierId,
    pub items: Vec<ReceiptLineRequest>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Orchestrates goods-receipt creation, confirmation, and rejection.
#[derive(Debug)]
pub struct GoodsReceiptWorkflow<S, R> {
    store: S,
    refs: R,
}

impl<S, R> GoodsReceiptWorkflow<S, R> {
    pub fn new(store: S, refs: R) -> Self {
        Self { store, refs }
    }
}

impl<S, R> GoodsReceiptWorkflow<S, R>
where
    S: ReceivingStore,
    R: ReferenceSource,
{
    /// Register a pending receipt for a completed order.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub fn create_receipt(&self, cmd: CreateGoodsReceipt) -> DomainResult<GoodsReceipt> {
        let mut tx = self.store.begin();

        let order = tx.order(cmd.order_id)?;
        if order.status() != OrderStatus::Completed {
            return Err(DomainError::business_rule(format!(
                "order {} is not completed",
                order.number()
            )));
        }

        if tx.order_has_received_receipt(cmd.order_id)? {
            return Err(DomainError::business_rule(format!(
                "order {} already has a received goods receipt",
                order.number()
            )));
        }

        let supplier = tx.supplier(cmd.supplier_id)?;

        let mut items = Vec::with_capacity(cmd.items.len());
        for line in &cmd.items {
            let product = tx.product(line.product_id)?;
            if !product.is_active() {
                return Err(DomainError::business_rule(format!(
                    "product {} is not active",
                    product.sku()
                )));
            }

            let ordered = order
                .items()
                .iter()
                .find(|item| item.product_id == line.product_id)
                .ok_or_else(|| {
                    DomainError::business_rule(format!(
                        "product {} is not part of order {}",
                        product.sku(),
                        order.number()
                    ))
                })?
                .quantity;

            items.push(GoodsReceiptItem::new(
                line.product_id,
                ordered,
                line.received_quantity,
            )?);
        }

        let receipt = GoodsReceipt::create(
            GoodsReceiptId::new(AggregateId::new()),
            self.refs.next_reference("REC"),
            cmd.order_id,
            cmd.supplier_id,
            supplier.name(),
            items,
            cmd.notes,
            cmd.occurred_at,
        );

        tx.stage_receipt(receipt.clone());
        tx.commit()?;

        info!(
            receipt = %receipt.number(),
            supplier = %receipt.supplier_name(),
            "goods receipt created"
        );
        Ok(receipt)
    }

    /// Confirm a pending receipt: credit stock once for every line with a
    /// positive received quantity and derive the terminal status.
    #[tracing::instrument(skip(self), fields(receipt_id = %receipt_id))]
    pub fn receive_receipt(
        &self,
        receipt_id: GoodsReceiptId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<GoodsReceipt> {
        let mut tx = self.store.begin();

        let receipt = tx.receipt(receipt_id)?;
        let received = receipt.receive(occurred_at)?;

        for item in received.items() {
            if item.received_quantity > 0 {
                let product = tx.product(item.product_id)?;
                tx.stage_product(product.increase_stock(item.received_quantity, occurred_at)?);
            }
        }
        tx.stage_receipt(received.clone());

        tx.commit()?;

        info!(
            receipt = %received.number(),
            status = ?received.status(),
            "goods receipt confirmed"
        );
        Ok(received)
    }

    /// Reject a receipt that was never received. No stock side effects.
    #[tracing::instrument(skip(self), fields(receipt_id = %receipt_id))]
    pub fn reject_receipt(&self, receipt_id: GoodsReceiptId) -> DomainResult<GoodsReceipt> {
        let mut tx = self.store.begin();

        let receipt = tx.receipt(receipt_id)?;
        let rejected = receipt.reject()?;

        tx.stage_receipt(rejected.clone());
        tx.commit()?;

        info!(receipt = %rejected.number(), "goods receipt rejected");
        Ok(rejected)
    }
}
