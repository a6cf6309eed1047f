use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use botica_core::{AggregateId, AggregateRoot, DomainError, DomainResult};
use botica_parties::SupplierId;
use botica_products::ProductId;
use botica_sales::OrderId;

/// Goods receipt identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodsReceiptId(pub AggregateId);

impl GoodsReceiptId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for GoodsReceiptId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Receipt status lifecycle: Pending → {Received, PartiallyReceived,
/// Rejected}, all terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoodsReceiptStatus {
    Pending,
    Received,
    PartiallyReceived,
    Rejected,
}

/// Receipt line: ordered quantity snapshotted from the order, received
/// quantity reported on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceiptItem {
    pub product_id: ProductId,
    pub ordered_quantity: u32,
    pub received_quantity: u32,
}

impl GoodsReceiptItem {
    /// Build a receipt line, enforcing `received <= ordered`.
    pub fn new(
        product_id: ProductId,
        ordered_quantity: u32,
        received_quantity: u32,
    ) -> DomainResult<Self> {
        if received_quantity > ordered_quantity {
            return Err(DomainError::business_rule(format!(
                "received quantity {received_quantity} exceeds ordered quantity {ordered_quantity}"
            )));
        }

        Ok(Self {
            product_id,
            ordered_quantity,
            received_quantity,
        })
    }

    /// How much of the ordered quantity is still missing.
    pub fn difference(&self) -> u32 {
        self.ordered_quantity - self.received_quantity
    }

    pub fn is_complete(&self) -> bool {
        self.received_quantity == self.ordered_quantity
    }
}

/// Aggregate root: GoodsReceipt.
///
/// Created only against a completed order, at most one fully-received
/// receipt per order; both rules are enforced by the workflow since they
/// need order and receipt lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceipt {
    id: GoodsReceiptId,
    number: String,
    order_id: OrderId,
    supplier_id: SupplierId,
    /// Supplier name denormalized at creation time.
    supplier_name: String,
    status: GoodsReceiptStatus,
    items: Vec<GoodsReceiptItem>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    version: u64,
}

impl GoodsReceipt {
    pub fn create(
        id: GoodsReceiptId,
        number: impl Into<String>,
        order_id: OrderId,
        supplier_id: SupplierId,
        supplier_name: impl Into<String>,
        items: Vec<GoodsReceiptItem>,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            number: number.into(),
            order_id,
            supplier_id,
            supplier_name: supplier_name.into(),
            status: GoodsReceiptStatus::Pending,
            items,
            notes,
            created_at: at,
            delivered_at: None,
            version: 1,
        }
    }

    pub fn id_typed(&self) -> GoodsReceiptId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn supplier_name(&self) -> &str {
        &self.supplier_name
    }

    pub fn status(&self) -> GoodsReceiptStatus {
        self.status
    }

    pub fn items(&self) -> &[GoodsReceiptItem] {
        &self.items
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Confirm the receipt, deriving its terminal status from per-line
    /// reconciliation and recording the actual delivery time.
    ///
    /// Fails with `InvalidState` unless pending, and with `BusinessRule`
    /// when the receipt has no items. Crediting stock for the received
    /// quantities is the workflow's job, driven by `items()`.
    ///
    /// Terminal status: every line complete → Received; every line zero →
    /// Rejected (a receive call where nothing arrived is recorded as a
    /// zero receipt rather than staying pending); any other mix →
    /// PartiallyReceived.
    pub fn receive(&self, at: DateTime<Utc>) -> DomainResult<Self> {
        if self.status != GoodsReceiptStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "cannot receive goods receipt {} in status {:?}",
                self.number, self.status
            )));
        }
        if self.items.is_empty() {
            return Err(DomainError::business_rule(
                "goods receipt has no items",
            ));
        }

        let status = if self.items.iter().all(GoodsReceiptItem::is_complete) {
            GoodsReceiptStatus::Received
        } else if self.items.iter().all(|item| item.received_quantity == 0) {
            GoodsReceiptStatus::Rejected
        } else {
            GoodsReceiptStatus::PartiallyReceived
        };

        let mut next = self.clone();
        next.status = status;
        next.delivered_at = Some(at);
        next.version += 1;
        Ok(next)
    }

    /// Reject the receipt. No stock side effects.
    ///
    /// A received receipt cannot be retroactively rejected (`InvalidState`);
    /// rejecting an already-rejected receipt is an idempotent re-set.
    pub fn reject(&self) -> DomainResult<Self> {
        if self.status == GoodsReceiptStatus::Received {
            return Err(DomainError::invalid_state(format!(
                "cannot reject received goods receipt {}",
                self.number
            )));
        }

        let mut next = self.clone();
        next.status = GoodsReceiptStatus::Rejected;
        next.version += 1;
        Ok(next)
    }
}

impl AggregateRoot for GoodsReceipt {
    type Id = GoodsReceiptId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
