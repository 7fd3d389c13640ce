use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use puntoventa_core::{DomainError, MovementId, ProductId, SaleId};

/// Append-only record of one stock change.
///
/// Negative deltas are deductions (sales), positive deltas are restocks or
/// corrections. Records are never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
}

/// A movement waiting to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: ProductId,
    pub delta: i64,
    pub description: String,
}

impl NewMovement {
    /// Deduction recorded for one sale line.
    ///
    /// The description references the originating sale, in the wording the
    /// dashboard already displays.
    pub fn sale_deduction(product_id: ProductId, quantity: i64, sale_id: SaleId) -> Self {
        Self {
            product_id,
            delta: -quantity,
            description: format!("Venta registrada con ID: {sale_id}"),
        }
    }

    /// Manual restock or correction.
    pub fn manual(product_id: ProductId, delta: i64, description: impl Into<String>) -> Self {
        Self {
            product_id,
            delta,
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        Ok(())
    }
}

/// Stock after applying `delta`, enforcing the non-negativity floor.
pub fn apply_delta(stock: i64, delta: i64) -> Result<i64, DomainError> {
    let next = stock + delta;
    if next < 0 {
        return Err(DomainError::invariant("stock cannot go negative"));
    }
    Ok(next)
}
