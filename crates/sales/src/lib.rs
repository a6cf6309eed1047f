//! `botica-sales`: sales orders and the order workflow.
//!
//! The `Order` aggregate owns the Pending → {Completed, Cancelled} status
//! machine and the total invariant; `OrderWorkflow` coordinates it with the
//! stock and credit ledgers inside a single unit-of-work.

pub mod order;
pub mod workflow;

pub use order::{Order, OrderId, OrderItem, OrderStatus};
pub use workflow::{CreateOrder, OrderLineRequest, OrderWorkflow, SalesStore, SalesTx};
