//! `botica-receiving`: goods receipts and the receiving workflow.
//!
//! A goods receipt records, per product line, how much of a completed
//! order's quantity actually arrived; confirming it credits stock back
//! through the stock ledger exactly once.

pub mod receipt;
pub mod workflow;

pub use receipt::{GoodsReceipt, GoodsReceiptId, GoodsReceiptItem, GoodsReceiptStatus};
pub use workflow::{
    CreateGoodsReceipt, GoodsReceiptWorkflow, ReceiptLineRequest, ReceivingStore, ReceivingTx,
};
