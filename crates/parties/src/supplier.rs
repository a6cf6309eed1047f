use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use botica_core::{AggregateId, AggregateRoot, DomainError, DomainResult};

/// Supplier identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub AggregateId);

impl SupplierId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SupplierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Supplier.
///
/// Read-only in this core; the receiving workflow looks suppliers up to
/// denormalize their name into goods receipts. Supplier CRUD lives outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    code: String,
    name: String,
    active: bool,
    version: u64,
    created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(
        id: SupplierId,
        code: impl Into<String>,
        name: impl Into<String>,
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
            active: true,
            version: 1,
            created_at: at,
        })
    }

    pub fn id_typed(&self) -> SupplierId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
