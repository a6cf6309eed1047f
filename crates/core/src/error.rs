//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Every
/// workflow operation fails with exactly one of these kinds; callers map
/// them to client-facing responses. Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity (order, product, customer, receipt, supplier)
    /// does not exist.
    #[error("not found")]
    NotFound,

    /// A caller-supplied primitive violates a basic constraint
    /// (e.g. non-positive quantity or amount, malformed identifier).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A domain rule is violated (inactive customer/product, insufficient
    /// stock or credit, duplicate receipt, ...).
    #[error("business rule violated: {0}")]
    BusinessRule(String),

    /// An aggregate is not in the state required for the requested
    /// transition (completing a non-pending order, cancelling a completed
    /// order, receiving a non-pending receipt, ...).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An optimistic concurrency check failed at commit time
    /// (a touched aggregate moved underneath the transaction).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
