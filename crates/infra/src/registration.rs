//! Sale registration: the validation-then-atomic-write core.
//!
//! Control flow: validate the request shape, read every referenced product,
//! verify existence and stock in input order (fail fast), snapshot prices
//! and compute the total, then hand the draft to the store's atomic write
//! sequence. No write happens before all validations pass.

use std::sync::Arc;

use puntoventa_sales::{PricedLine, RegistrationError, Sale, SaleDraft, SaleRequest};

use crate::store::{Store, StoreError};

/// Registers sales against a [`Store`].
#[derive(Clone)]
pub struct SaleRegistrationService {
    store: Arc<dyn Store>,
}

impl SaleRegistrationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a sale, or reject it without side effects.
    ///
    /// Prices and stock are read once here; the store re-checks stock when
    /// it applies the decrement, so a request that lost a race since
    /// validation comes back as [`RegistrationError::InsufficientStock`]
    /// with the stock observed at write time.
    pub async fn register_sale(&self, request: SaleRequest) -> Result<Sale, RegistrationError> {
        request.validate()?;

        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = self
                .store
                .product(item.product_id)
                .await
                .map_err(|err| {
                    tracing::error!(product_id = %item.product_id, error = ?err, "product read failed during validation");
                    RegistrationError::Processing
                })?
                .ok_or(RegistrationError::ProductNotFound(item.product_id))?;

            if !product.has_stock(item.quantity) {
                return Err(RegistrationError::InsufficientStock {
                    product_id: item.product_id,
                    available: product.stock,
                    requested: item.quantity,
                });
            }

            lines.push(PricedLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: product.sale_price,
            });
        }

        let draft = SaleDraft::new(request.buyer_id, lines);

        match self.store.execute_sale(draft).await {
            Ok(sale) => {
                tracing::info!(sale_id = %sale.id, buyer_id = %sale.buyer_id, total = %sale.total, "sale registered");
                Ok(sale)
            }
            Err(StoreError::StockConflict {
                product_id,
                available,
                requested,
            }) => Err(RegistrationError::InsufficientStock {
                product_id,
                available,
                requested,
            }),
            Err(err) => {
                tracing::error!(error = ?err, "sale write sequence failed");
                Err(RegistrationError::Processing)
            }
        }
    }
}
