//! Persistent store boundary.
//!
//! One object-safe trait covers products, categories, sales, line items, and
//! inventory movements. The sale write sequence and the manual-movement
//! write are single trait methods because their atomicity is a backend
//! concern: Postgres runs them in one transaction, the in-memory store under
//! one write lock with staged mutations. Both re-check stock at write time,
//! so stock can never be observed negative, even under concurrent load.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryStore, SaleFailPoint};
pub use postgres::PostgresStore;

use async_trait::async_trait;
use thiserror::Error;

use puntoventa_core::{CategoryId, MovementId, ProductId, SaleId};
use puntoventa_inventory::{Movement, NewMovement};
use puntoventa_products::{Category, NewProduct, Product, ProductPatch};
use puntoventa_sales::{LineItem, Sale, SaleDraft};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error from the persistence layer.
///
/// The `*Write` variants name the step of the sale write sequence that
/// failed, so logs identify which write gave out; callers see them as an
/// opaque processing failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional stock update found less stock than required at write
    /// time. `requested` is the quantity being deducted.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    StockConflict {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,

    #[error("sale header write failed")]
    SaleWrite(#[source] BoxError),

    #[error("line item write failed")]
    LineItemWrite(#[source] BoxError),

    #[error("stock update write failed")]
    StockWrite(#[source] BoxError),

    #[error("movement write failed")]
    MovementWrite(#[source] BoxError),

    /// Any other backend failure (connection, query, row decode).
    #[error("storage backend error")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub(crate) fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }
}

/// 1-based pagination window for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 25,
        }
    }
}

impl Page {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.page_size)
    }

    /// Number of pages needed for `total` rows.
    pub fn page_count(&self, total: u64) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        total.div_ceil(u64::from(self.page_size))
    }
}

/// Persistent store for the catalog, the sale records, and the movement log.
#[async_trait]
pub trait Store: Send + Sync {
    // ── products ────────────────────────────────────────────────────────

    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// One page of products plus the total row count (for the pagination
    /// envelope).
    async fn list_products(&self, page: Page) -> Result<(Vec<Product>, u64), StoreError>;

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;

    // ── categories ──────────────────────────────────────────────────────

    async fn insert_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Category, StoreError>;

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    // ── inventory movements ─────────────────────────────────────────────

    /// Apply a manual movement: conditionally adjust the product's stock
    /// (floor at zero), then append the movement record. Atomic.
    async fn register_movement(&self, new: NewMovement) -> Result<Movement, StoreError>;

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError>;

    /// Movement log, newest first.
    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError>;

    // ── sales ───────────────────────────────────────────────────────────

    /// Execute the sale write sequence atomically: sale header, then per
    /// line item in input order: line item row, conditional stock
    /// decrement, movement entry. A write-time stock shortfall aborts the
    /// whole sequence with [`StoreError::StockConflict`].
    async fn execute_sale(&self, draft: SaleDraft) -> Result<Sale, StoreError>;

    async fn sale(&self, id: SaleId) -> Result<Option<(Sale, Vec<LineItem>)>, StoreError>;

    /// Sale headers, newest first.
    async fn list_sales(&self) -> Result<Vec<Sale>, StoreError>;
}
