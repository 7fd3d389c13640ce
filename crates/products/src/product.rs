use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use puntoventa_core::{CategoryId, DomainError, ProductId};

/// Catalog product with its current stock level.
///
/// `stock` is authoritative for availability checks and is mutated only
/// through the store's conditional updates (sale registration and inventory
/// movements), so it never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub active: bool,
    pub stock: i64,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when the requested quantity can be served from current stock.
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub active: bool,
    pub stock: i64,
    pub category_id: Option<CategoryId>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.purchase_price < Decimal::ZERO {
            return Err(DomainError::validation("purchase price cannot be negative"));
        }
        if self.sale_price < Decimal::ZERO {
            return Err(DomainError::validation("sale price cannot be negative"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(())
    }
}

/// Partial product update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub active: Option<bool>,
    pub stock: Option<i64>,
    pub category_id: Option<CategoryId>,
}

impl ProductPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if matches!(self.purchase_price, Some(p) if p < Decimal::ZERO) {
            return Err(DomainError::validation("purchase price cannot be negative"));
        }
        if matches!(self.sale_price, Some(p) if p < Decimal::ZERO) {
            return Err(DomainError::validation("sale price cannot be negative"));
        }
        if matches!(self.stock, Some(s) if s < 0) {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(())
    }

    /// Apply the patch in place, bumping `updated_at`.
    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(purchase_price) = self.purchase_price {
            product.purchase_price = purchase_price;
        }
        if let Some(sale_price) = self.sale_price {
            product.sale_price = sale_price;
        }
        if let Some(active) = self.active {
            product.active = active;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = Some(category_id);
        }
        product.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            purchase_price: dec!(7.50),
            sale_price: dec!(10.00),
            active: true,
            stock: 5,
            category_id: None,
        }
    }

    fn existing_product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Café molido".to_string(),
            description: None,
            purchase_price: dec!(7.50),
            sale_price: dec!(10.00),
            active: true,
            stock: 5,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_product_accepts_valid_input() {
        assert!(new_product("Café molido").validate().is_ok());
    }

    #[test]
    fn new_product_rejects_blank_name() {
        let err = new_product("   ").validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_product_rejects_negative_prices_and_stock() {
        let mut p = new_product("Café molido");
        p.sale_price = dec!(-1);
        assert!(p.validate().is_err());

        let mut p = new_product("Café molido");
        p.purchase_price = dec!(-0.01);
        assert!(p.validate().is_err());

        let mut p = new_product("Café molido");
        p.stock = -3;
        assert!(p.validate().is_err());
    }

    #[test]
    fn has_stock_checks_requested_quantity() {
        let product = existing_product();
        assert!(product.has_stock(5));
        assert!(!product.has_stock(6));
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut product = existing_product();
        let before = product.clone();
        let now = Utc::now();

        let patch = ProductPatch {
            sale_price: Some(dec!(12.00)),
            stock: Some(8),
            ..ProductPatch::default()
        };
        patch.validate().unwrap();
        patch.apply(&mut product, now);

        assert_eq!(product.sale_price, dec!(12.00));
        assert_eq!(product.stock, 8);
        assert_eq!(product.name, before.name);
        assert_eq!(product.purchase_price, before.purchase_price);
        assert_eq!(product.updated_at, now);
    }

    #[test]
    fn patch_rejects_negative_values() {
        let patch = ProductPatch {
            stock: Some(-1),
            ..ProductPatch::default()
        };
        assert!(patch.validate().is_err());
    }
}
