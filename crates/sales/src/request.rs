use serde::{Deserialize, Serialize};

use puntoventa_core::{ProductId, UserId};

use crate::error::{InvalidSaleRequest, RegistrationError};

/// Incoming sale request: buyer plus the ordered line items.
///
/// Transient; never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub buyer_id: UserId,
    pub items: Vec<LineItemRequest>,
}

/// One requested product/quantity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl SaleRequest {
    /// Shape validation; runs before any store read or write.
    ///
    /// Checks items in input order and reports the first failure.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.items.is_empty() {
            return Err(InvalidSaleRequest::Empty.into());
        }
        for item in &self.items {
            if item.quantity <= 0 {
                return Err(InvalidSaleRequest::NonPositiveQuantity(item.product_id).into());
            }
        }
        Ok(())
    }
}
