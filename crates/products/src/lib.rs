//! `botica-products`: product catalog and the stock ledger.
//!
//! The `Product` aggregate owns the stock quantity; `increase_stock` and
//! `decrease_stock` are the only write paths for it.

pub mod product;

pub use product::{Product, ProductId};
