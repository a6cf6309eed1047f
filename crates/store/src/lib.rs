//! `botica-store`: in-memory transactional store and reference generation.
//!
//! Implements the unit-of-work ports of the sales and receiving workflows
//! with snapshot-staged writes, an all-or-nothing commit, and per-aggregate
//! optimistic version checks. Intended for tests/dev; a relational adapter
//! would implement the same traits over real transactions.

pub mod memory;
pub mod reference;


pub use memory::{InMemoryStore, MemoryTx};
pub use reference::ClockReferenceSource;
