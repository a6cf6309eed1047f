use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use botica_core::{AggregateId, AggregateRoot, DomainError, DomainResult};

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub AggregateId);

impl CustomerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Customer.
///
/// The pending balance is mutated exclusively through
/// [`Customer::increase_balance`] and [`Customer::decrease_balance`], both
/// pure transitions returning the next state. The credit check is a separate
/// read ([`Customer::has_credit_available`]) performed by the order workflow
/// before the increase; the check-then-act pair is made atomic by the
/// workflow's enclosing transaction, not by this aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    code: String,
    name: String,
    /// Credit line in smallest currency unit; `None` means no credit granted.
    credit_limit: Option<u64>,
    /// Outstanding balance in smallest currency unit. Starts at zero.
    pending_balance: u64,
    active: bool,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Customer {
    /// Register a new customer with a zero pending balance.
    pub fn new(
        id: CustomerId,
        code: impl Into<String>,
        name: impl Into<String>,
        credit_limit: Option<u64>,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = code.into();
        let name = name.into();

        if code.trim().is_empty() {
            return Err(DomainError::invalid_argument("code cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument("name cannot be empty"));
        }

        Ok(Self {
            id,
            code,
            name,
            credit_limit,
            pending_balance: 0,
            active: true,
            version: 1,
            created_at: at,
            updated_at: at,
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn credit_limit(&self) -> Option<u64> {
        self.credit_limit
    }

    pub fn pending_balance(&self) -> u64 {
        self.pending_balance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Credit the customer could still consume.
    pub fn available_credit(&self) -> u64 {
        self.credit_limit
            .map(|limit| limit.saturating_sub(self.pending_balance))
            .unwrap_or(0)
    }

    /// An active customer carrying an outstanding balance.
    pub fn is_moroso(&self) -> bool {
        self.active && self.pending_balance > 0
    }

    /// True iff the customer is active, has a credit line, and `amount`
    /// fits within the remaining credit.
    pub fn has_credit_available(&self, amount: u64) -> bool {
        if !self.active {
            return false;
        }
        match self.credit_limit {
            Some(_) => amount <= self.available_credit(),
            None => false,
        }
    }

    /// Add `amount` to the pending balance unconditionally.
    ///
    /// Fails with `InvalidArgument` for a zero amount. The credit check is
    /// the caller's responsibility, performed before calling this.
    pub fn increase_balance(&self, amount: u64, at: DateTime<Utc>) -> DomainResult<Self> {
        if amount == 0 {
            return Err(DomainError::invalid_argument("amount must be positive"));
        }

        let mut next = self.clone();
        next.pending_balance += amount;
        next.updated_at = at;
        next.version += 1;
        Ok(next)
    }

    /// Settle `amount` against the pending balance.
    ///
    /// Fails with `InvalidArgument` for a zero amount and with
    /// `InvalidState` when the amount exceeds the outstanding balance
    /// (a payment or reversal can never overshoot).
    pub fn decrease_balance(&self, amount: u64, at: DateTime<Utc>) -> DomainResult<Self> {
        if amount == 0 {
            return Err(DomainError::invalid_argument("amount must be positive"));
        }
        if amount > self.pending_balance {
            return Err(DomainError::invalid_state(format!(
                "amount {amount} exceeds pending balance {}",
                self.pending_balance
            )));
        }

        let mut next = self.clone();
        next.pending_balance -= amount;
        next.updated_at = at;
        next.version += 1;
        Ok(next)
    }

    /// Deactivate the customer; the outstanding balance is retained.
    pub fn deactivate(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.active = false;
        next.updated_at = at;
        next.version += 1;
        next
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
