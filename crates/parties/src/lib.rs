//! `botica-parties`: customers (with their credit ledger) and suppliers.

pub mod customer;
pub mod supplier;

pub use customer::{Customer, CustomerId};
pub use supplier::{Supplier, SupplierId};
