//! In-memory transactional store.
//!
//! Not optimized for performance. Transactions stage cloned next-states and
//! apply them in one locked commit; the version observed at first read is
//! re-checked under the write lock, so two transactions racing over the same
//! product or customer cannot both commit against the same pre-mutation
//! state.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use tracing::debug;

use botica_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion};
use botica_parties::{Customer, CustomerId, Supplier, SupplierId};
use botica_products::{Product, ProductId};
use botica_receiving::{
    GoodsReceipt, GoodsReceiptId, GoodsReceiptStatus, ReceivingStore, ReceivingTx,
};
use botica_sales::{Order, OrderId, SalesStore, SalesTx};

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    customers: HashMap<CustomerId, Customer>,
    suppliers: HashMap<SupplierId, Supplier>,
    orders: HashMap<OrderId, Order>,
    receipts: HashMap<GoodsReceiptId, GoodsReceipt>,
}

/// In-memory store over typed aggregate tables.
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Tables>>,
}

fn lock_poisoned() -> DomainError {
    DomainError::conflict("store lock poisoned")
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding bypasses the transactional path; fixtures and the out-of-scope
    // CRUD layers insert through these.

    pub fn seed_product(&self, product: Product) {
        if let Ok(mut tables) = self.inner.write() {
            tables.products.insert(product.id_typed(), product);
        }
    }

    pub fn seed_customer(&self, customer: Customer) {
        if let Ok(mut tables) = self.inner.write() {
            tables.customers.insert(customer.id_typed(), customer);
        }
    }

    pub fn seed_supplier(&self, supplier: Supplier) {
        if let Ok(mut tables) = self.inner.write() {
            tables.suppliers.insert(supplier.id_typed(), supplier);
        }
    }

    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.inner.read().ok()?.products.get(&id).cloned()
    }

    pub fn customer(&self, id: CustomerId) -> Option<Customer> {
        self.inner.read().ok()?.customers.get(&id).cloned()
    }

    pub fn supplier(&self, id: SupplierId) -> Option<Supplier> {
        self.inner.read().ok()?.suppliers.get(&id).cloned()
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.inner.read().ok()?.orders.get(&id).cloned()
    }

    pub fn receipt(&self, id: GoodsReceiptId) -> Option<GoodsReceipt> {
        self.inner.read().ok()?.receipts.get(&id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.inner.read().map(|t| t.orders.len()).unwrap_or(0)
    }

    pub fn receipt_count(&self) -> usize {
        self.inner.read().map(|t| t.receipts.len()).unwrap_or(0)
    }

    fn begin_tx(&self) -> MemoryTx {
        MemoryTx {
            store: self.clone(),
            read_products: HashMap::new(),
            read_customers: HashMap::new(),
            read_suppliers: HashMap::new(),
            read_orders: HashMap::new(),
            read_receipts: HashMap::new(),
            staged_products: HashMap::new(),
            staged_customers: HashMap::new(),
            staged_orders: HashMap::new(),
            staged_receipts: HashMap::new(),
        }
    }
}

/// Read through staged writes first; on the first store read of an
/// aggregate, record the version observed for the commit-time check.
fn tx_read<K, A>(
    table: &HashMap<K, A>,
    staged: &HashMap<K, A>,
    read_set: &mut HashMap<K, u64>,
    id: K,
) -> DomainResult<A>
where
    K: Copy + Eq + Hash,
    A: AggregateRoot<Id = K> + Clone,
{
    if let Some(aggregate) = staged.get(&id) {
        return Ok(aggregate.clone());
    }
    let aggregate = table.get(&id).cloned().ok_or(DomainError::NotFound)?;
    read_set.entry(id).or_insert_with(|| aggregate.version());
    Ok(aggregate)
}

/// Verify, under the write lock, that nothing this transaction read or is
/// about to write moved underneath it. Staged aggregates that were never
/// read must still be absent from the store.
fn check_table<K, A>(
    table: &HashMap<K, A>,
    read_set: &HashMap<K, u64>,
    staged: &HashMap<K, A>,
) -> DomainResult<()>
where
    K: Copy + Eq + Hash,
    A: AggregateRoot<Id = K>,
{
    for (id, expected) in read_set {
        let actual = table.get(id).map(|a| a.version()).unwrap_or(0);
        ExpectedVersion::Exact(*expected).check(actual)?;
    }
    for id in staged.keys() {
        if !read_set.contains_key(id) {
            let actual = table.get(id).map(|a| a.version()).unwrap_or(0);
            ExpectedVersion::Exact(0).check(actual)?;
        }
    }
    Ok(())
}

fn apply_table<K, A>(table: &mut HashMap<K, A>, staged: HashMap<K, A>)
where
    K: Eq + Hash,
{
    for (id, aggregate) in staged {
        table.insert(id, aggregate);
    }
}

/// One unit-of-work over the shared tables.
///
/// Dropping the transaction without committing discards everything staged.
#[derive(Debug)]
pub struct MemoryTx {
    store: InMemoryStore,
    read_products: HashMap<ProductId, u64>,
    read_customers: HashMap<CustomerId, u64>,
    read_suppliers: HashMap<SupplierId, u64>,
    read_orders: HashMap<OrderId, u64>,
    read_receipts: HashMap<GoodsReceiptId, u64>,
    staged_products: HashMap<ProductId, Product>,
    staged_customers: HashMap<CustomerId, Customer>,
    staged_orders: HashMap<OrderId, Order>,
    staged_receipts: HashMap<GoodsReceiptId, GoodsReceipt>,
}

impl MemoryTx {
    fn read_product(&mut self, id: ProductId) -> DomainResult<Product> {
        let tables = self.store.inner.read().map_err(|_| lock_poisoned())?;
        tx_read(
            &tables.products,
            &self.staged_products,
            &mut self.read_products,
            id,
        )
    }

    fn read_customer(&mut self, id: CustomerId) -> DomainResult<Customer> {
        let tables = self.store.inner.read().map_err(|_| lock_poisoned())?;
        tx_read(
            &tables.customers,
            &self.staged_customers,
            &mut self.read_customers,
            id,
        )
    }

    fn read_supplier(&mut self, id: SupplierId) -> DomainResult<Supplier> {
        let tables = self.store.inner.read().map_err(|_| lock_poisoned())?;
        let supplier = tables
            .suppliers
            .get(&id)
            .cloned()
            .ok_or(DomainError::NotFound)?;
        self.read_suppliers
            .entry(id)
            .or_insert_with(|| supplier.version());
        Ok(supplier)
    }

    fn read_order(&mut self, id: OrderId) -> DomainResult<Order> {
        let tables = self.store.inner.read().map_err(|_| lock_poisoned())?;
        tx_read(&tables.orders, &self.staged_orders, &mut self.read_orders, id)
    }

    fn read_receipt(&mut self, id: GoodsReceiptId) -> DomainResult<GoodsReceipt> {
        let tables = self.store.inner.read().map_err(|_| lock_poisoned())?;
        tx_read(
            &tables.receipts,
            &self.staged_receipts,
            &mut self.read_receipts,
            id,
        )
    }

    fn commit_tx(self) -> DomainResult<()> {
        let mut tables = self.store.inner.write().map_err(|_| lock_poisoned())?;
        let empty_suppliers: HashMap<SupplierId, Supplier> = HashMap::new();

        // All checks before any write: commit is all-or-nothing.
        check_table(&tables.products, &self.read_products, &self.staged_products)?;
        check_table(
            &tables.customers,
            &self.read_customers,
            &self.staged_customers,
        )?;
        check_table(&tables.suppliers, &self.read_suppliers, &empty_suppliers)?;
        check_table(&tables.orders, &self.read_orders, &self.staged_orders)?;
        check_table(&tables.receipts, &self.read_receipts, &self.staged_receipts)?;

        debug!(
            products = self.staged_products.len(),
            customers = self.staged_customers.len(),
            orders = self.staged_orders.len(),
            receipts = self.staged_receipts.len(),
            "committing transaction"
        );

        apply_table(&mut tables.products, self.staged_products);
        apply_table(&mut tables.customers, self.staged_customers);
        apply_table(&mut tables.orders, self.staged_orders);
        apply_table(&mut tables.receipts, self.staged_receipts);
        Ok(())
    }
}

impl SalesTx for MemoryTx {
    fn customer(&mut self, id: CustomerId) -> DomainResult<Customer> {
        self.read_customer(id)
    }

    fn product(&mut self, id: ProductId) -> DomainResult<Product> {
        self.read_product(id)
    }

    fn order(&mut self, id: OrderId) -> DomainResult<Order> {
        self.read_order(id)
    }

    fn stage_customer(&mut self, customer: Customer) {
        self.staged_customers.insert(customer.id_typed(), customer);
    }

    fn stage_product(&mut self, product: Product) {
        self.staged_products.insert(product.id_typed(), product);
    }

    fn stage_order(&mut self, order: Order) {
        self.staged_orders.insert(order.id_typed(), order);
    }

    fn commit(self) -> DomainResult<()> {
        self.commit_tx()
    }
}

impl ReceivingTx for MemoryTx {
    fn order(&mut self, id: OrderId) -> DomainResult<Order> {
        self.read_order(id)
    }

    fn supplier(&mut self, id: SupplierId) -> DomainResult<Supplier> {
        self.read_supplier(id)
    }

    fn product(&mut self, id: ProductId) -> DomainResult<Product> {
        self.read_product(id)
    }

    fn receipt(&mut self, id: GoodsReceiptId) -> DomainResult<GoodsReceipt> {
        self.read_receipt(id)
    }

    fn order_has_received_receipt(&self, order_id: OrderId) -> DomainResult<bool> {
        if self
            .staged_receipts
            .values()
            .any(|r| r.order_id() == order_id && r.status() == GoodsReceiptStatus::Received)
        {
            return Ok(true);
        }
        let tables = self.store.inner.read().map_err(|_| lock_poisoned())?;
        Ok(tables
            .receipts
            .values()
            .any(|r| r.order_id() == order_id && r.status() == GoodsReceiptStatus::Received))
    }

    fn stage_product(&mut self, product: Product) {
        self.staged_products.insert(product.id_typed(), product);
    }

    fn stage_receipt(&mut self, receipt: GoodsReceipt) {
        self.staged_receipts.insert(receipt.id_typed(), receipt);
    }

    fn commit(self) -> DomainResult<()> {
        self.commit_tx()
    }
}

impl SalesStore for InMemoryStore {
    type Tx = MemoryTx;

    fn begin(&self) -> Self::Tx {
        self.begin_tx()
    }
}

impl ReceivingStore for InMemoryStore {
    type Tx = MemoryTx;

    fn begin(&self) -> Self::Tx {
        self.begin_tx()
    }
}
