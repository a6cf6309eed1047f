use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use botica_core::{AggregateId, AggregateRoot, DomainError, DomainResult};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Product.
///
/// Stock is mutated exclusively through [`Product::increase_stock`] and
/// [`Product::decrease_stock`]. Both are pure: they validate the mutation
/// against the current state and return the next state, leaving `self`
/// untouched; the enclosing transaction stages the returned state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    /// Price in smallest currency unit (e.g., cents).
    unit_price: u64,
    stock: u32,
    min_stock: u32,
    active: bool,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Register a new product.
    ///
    /// Product creation itself is conventional CRUD; it lives here so the
    /// stock fields start out satisfying their invariants.
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: u64,
        stock: u32,
        min_stock: u32,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let name = name.into();

        if sku.trim().is_empty() {
            return Err(DomainError::invalid_argument("sku cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument("name cannot be empty"));
        }

        Ok(Self {
            id,
            sku,
            name,
            unit_price,
            stock,
            min_stock,
            active: true,
            version: 1,
            created_at: at,
            updated_at: at,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn min_stock(&self) -> u32 {
        self.min_stock
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stock at or below the restock threshold.
    pub fn needs_restock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Check if the product can be sold (active with stock on hand).
    pub fn is_available(&self) -> bool {
        self.active && self.stock > 0
    }

    /// Reduce stock by `quantity`, advancing the update timestamp.
    ///
    /// Fails with `InvalidArgument` for a zero quantity and with
    /// `BusinessRule` when the requested quantity exceeds the stock on hand.
    /// May flip `needs_restock`; never deactivates the product.
    pub fn decrease_stock(&self, quantity: u32, at: DateTime<Utc>) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::invalid_argument("quantity must be positive"));
        }
        if quantity > self.stock {
            return Err(DomainError::business_rule(format!(
                "insufficient stock for product {}: requested {quantity}, available {}",
                self.sku, self.stock
            )));
        }

        let mut next = self.clone();
        next.stock -= quantity;
        next.updated_at = at;
        next.version += 1;
        Ok(next)
    }

    /// Add `quantity` to stock, advancing the update timestamp.
    ///
    /// Fails with `InvalidArgument` for a zero quantity; otherwise always
    /// succeeds (existence of the product is the caller's lookup concern).
    pub fn increase_stock(&self, quantity: u32, at: DateTime<Utc>) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::invalid_argument("quantity must be positive"));
        }

        let mut next = self.clone();
        next.stock += quantity;
        next.updated_at = at;
        next.version += 1;
        Ok(next)
    }

    /// Deactivate the product. Stock is retained; availability drops.
    pub fn deactivate(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.active = false;
        next.updated_at = at;
        next.version += 1;
        next
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

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
    use proptest::prelude::*;

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_product(stock: u32, min_stock: u32) -> Product {
        Product::new(
            test_product_id(),
            "SKU-001",
            "Paracetamol 500mg",
            100,
            stock,
            min_stock,
            test_time(),
        )
        .unwrap()
    }

    #[test]
    fn decrease_stock_reduces_and_advances_timestamp() {
        let product = test_product(50, 5);
        let before = product.updated_at();

        let later = before + chrono::Duration::seconds(1);
        let next = product.decrease_stock(3, later).unwrap();

        assert_eq!(next.stock(), 47);
        assert_eq!(next.updated_at(), later);
        assert_eq!(next.version(), product.version() + 1);
        // Original state untouched.
        assert_eq!(product.stock(), 50);
    }

    #[test]
    fn decrease_stock_rejects_zero_quantity() {
        let product = test_product(50, 5);
        let err = product.decrease_stock(0, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn decrease_stock_rejects_overshoot() {
        let product = test_product(2, 0);
        let err = product.decrease_stock(5, test_time()).unwrap_err();
        match err {
            DomainError::BusinessRule(msg) if msg.contains("insufficient stock") => {}
            _ => panic!("Expected BusinessRule for insufficient stock"),
        }
    }

    #[test]
    fn increase_stock_rejects_zero_quantity() {
        let product = test_product(0, 0);
        let err = product.increase_stock(0, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn decrease_can_flip_needs_restock_without_deactivating() {
        let product = test_product(6, 5);
        assert!(!product.needs_restock());

        let next = product.decrease_stock(1, test_time()).unwrap();
        assert!(next.needs_restock());
        assert!(next.is_active());
    }

    #[test]
    fn availability_requires_active_and_stock() {
        let product = test_product(1, 0);
        assert!(product.is_available());

        let out_of_stock = product.decrease_stock(1, test_time()).unwrap();
        assert!(!out_of_stock.is_available());

        let inactive = product.deactivate(test_time());
        assert!(!inactive.is_available());
    }

    #[test]
    fn new_product_rejects_blank_sku() {
        let err = Product::new(test_product_id(), "  ", "Aspirin", 100, 0, 0, test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of ledger calls that individually
        /// succeed, stock matches the replayed arithmetic after each call
        /// (and, being u32, can never go negative).
        #[test]
        fn successful_ledger_calls_conserve_stock(
            initial in 0u32..1_000,
            deltas in prop::collection::vec((any::<bool>(), 1u32..100), 1..20)
        ) {
            let mut product = test_product(initial, 0);
            let mut expected = initial;

            for (is_increase, qty) in deltas {
                let at = test_time();
                if is_increase {
                    product = product.increase_stock(qty, at).unwrap();
                    expected += qty;
                } else {
                    match product.decrease_stock(qty, at) {
                        Ok(next) => {
                            prop_assert!(qty <= expected);
                            expected -= qty;
                            product = next;
                        }
                        Err(DomainError::BusinessRule(_)) => {
                            prop_assert!(qty > expected);
                        }
                        Err(other) => return Err(TestCaseError::fail(format!(
                            "unexpected error: {other:?}"
                        ))),
                    }
                }
                prop_assert_eq!(product.stock(), expected);
            }
        }
    }
}
