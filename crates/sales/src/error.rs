use thiserror::Error;

use puntoventa_core::ProductId;

/// Shape problems detected before any store access.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSaleRequest {
    /// The request carried no line items.
    #[error("no items in sale")]
    Empty,

    /// A line item requested a zero or negative quantity.
    #[error("quantity must be positive for product {0}")]
    NonPositiveQuantity(ProductId),
}

/// Why a sale registration was rejected or failed.
///
/// The first three variants are produced before any write and are safe to
/// retry once the request (or the stock) changes. `Processing` covers
/// write-phase failures; the write sequence is applied atomically by the
/// store, so no partial state remains, and the cause is only logged
/// server-side.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// Malformed input; nothing was read or written.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidSaleRequest),

    /// A referenced product does not exist; nothing was written.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Available stock cannot cover the requested quantity. Reported from
    /// the validation read, or from the store's re-check at write time when
    /// a concurrent sale won the race.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The write sequence failed for an infrastructural reason.
    #[error("sale could not be processed")]
    Processing,
}
