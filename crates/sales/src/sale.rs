use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use puntoventa_core::{LineItemId, ProductId, SaleId, UserId};

/// Sale header: one completed transaction.
///
/// Created exactly once per successful registration; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub buyer_id: UserId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One product/quantity/price entry within a sale.
///
/// `unit_price` is the product's sale price captured when the sale was
/// registered; later catalog price changes do not affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub sale_id: SaleId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A line item priced at validation time (price snapshot).
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A fully validated sale, ready for the store's atomic write sequence.
///
/// The total is fixed here, from the snapshot prices; the store never
/// re-reads prices during the writes.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub buyer_id: UserId,
    pub total: Decimal,
    pub lines: Vec<PricedLine>,
}

impl SaleDraft {
    pub fn new(buyer_id: UserId, lines: Vec<PricedLine>) -> Self {
        let total = lines.iter().map(PricedLine::subtotal).sum();
        Self {
            buyer_id,
            total,
            lines,
        }
    }
}
