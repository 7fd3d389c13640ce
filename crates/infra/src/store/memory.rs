//! In-memory store (dev/test).
//!
//! All tables live behind a single `RwLock`, so the sale write sequence and
//! manual movements are trivially atomic: mutations are staged while the
//! write lock is held and only land in the tables once every step has
//! passed.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use puntoventa_core::{CategoryId, LineItemId, MovementId, ProductId, SaleId};
use puntoventa_inventory::{apply_delta, Movement, NewMovement};
use puntoventa_products::{Category, NewProduct, Product, ProductPatch};
use puntoventa_sales::{LineItem, Sale, SaleDraft};

use super::{BoxError, Page, Store, StoreError};

/// Force the next `execute_sale` to fail at a given step (test support for
/// the processing-failure path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleFailPoint {
    SaleWrite,
    LineItemWrite,
    StockWrite,
    MovementWrite,
}

#[derive(Default)]
struct Sequences {
    product: i64,
    category: i64,
    sale: i64,
    line_item: i64,
    movement: i64,
}

impl Sequences {
    fn next(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

#[derive(Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    categories: BTreeMap<i64, Category>,
    sales: BTreeMap<i64, Sale>,
    line_items: Vec<LineItem>,
    movements: Vec<Movement>,
    seq: Sequences,
    fail_next: Option<SaleFailPoint>,
}

/// In-memory [`Store`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_sale_step(&self, step: SaleFailPoint) {
        self.tables.write().unwrap().fail_next = Some(step);
    }
}

fn injected() -> BoxError {
    "injected failure".into()
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut guard = self.tables.write().unwrap();
        let t = &mut *guard;
        let now = Utc::now();

        let product = Product {
            id: ProductId::new(Sequences::next(&mut t.seq.product)),
            name: new.name,
            description: new.description,
            purchase_price: new.purchase_price,
            sale_price: new.sale_price,
            active: new.active,
            stock: new.stock,
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        };
        t.products.insert(product.id.as_i64(), product.clone());
        Ok(product)
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let guard = self.tables.read().unwrap();
        Ok(guard.products.get(&id.as_i64()).cloned())
    }

    async fn list_products(&self, page: Page) -> Result<(Vec<Product>, u64), StoreError> {
        let guard = self.tables.read().unwrap();
        let total = guard.products.len() as u64;
        let items = guard
            .products
            .values()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError> {
        let mut guard = self.tables.write().unwrap();
        let product = guard
            .products
            .get_mut(&id.as_i64())
            .ok_or(StoreError::NotFound)?;
        patch.apply(product, Utc::now());
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let mut guard = self.tables.write().unwrap();
        guard
            .products
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn insert_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Category, StoreError> {
        let mut guard = self.tables.write().unwrap();
        let t = &mut *guard;
        let category = Category {
            id: CategoryId::new(Sequences::next(&mut t.seq.category)),
            name,
            description,
        };
        t.categories.insert(category.id.as_i64(), category.clone());
        Ok(category)
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let guard = self.tables.read().unwrap();
        Ok(guard.categories.get(&id.as_i64()).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let guard = self.tables.read().unwrap();
        Ok(guard.categories.values().cloned().collect())
    }

    async fn register_movement(&self, new: NewMovement) -> Result<Movement, StoreError> {
        let mut guard = self.tables.write().unwrap();
        let t = &mut *guard;
        let now = Utc::now();

        let product = t
            .products
            .get_mut(&new.product_id.as_i64())
            .ok_or(StoreError::NotFound)?;
        let next = apply_delta(product.stock, new.delta).map_err(|_| StoreError::StockConflict {
            product_id: new.product_id,
            available: product.stock,
            requested: -new.delta,
        })?;
        product.stock = next;
        product.updated_at = now;

        let movement = Movement {
            id: MovementId::new(Sequences::next(&mut t.seq.movement)),
            product_id: new.product_id,
            delta: new.delta,
            occurred_at: now,
            description: new.description,
        };
        t.movements.push(movement.clone());
        Ok(movement)
    }

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        let guard = self.tables.read().unwrap();
        Ok(guard.movements.iter().find(|m| m.id == id).cloned())
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        let guard = self.tables.read().unwrap();
        Ok(guard.movements.iter().rev().cloned().collect())
    }

    async fn execute_sale(&self, draft: SaleDraft) -> Result<Sale, StoreError> {
        let mut guard = self.tables.write().unwrap();
        let t = &mut *guard;
        let fail = t.fail_next.take();
        let now = Utc::now();

        if matches!(fail, Some(SaleFailPoint::SaleWrite)) {
            return Err(StoreError::SaleWrite(injected()));
        }
        let sale = Sale {
            id: SaleId::new(Sequences::next(&mut t.seq.sale)),
            buyer_id: draft.buyer_id,
            total: draft.total,
            created_at: now,
        };

        // Stage every write; nothing lands in the tables until all steps
        // have passed.
        let mut working: BTreeMap<i64, Product> = BTreeMap::new();
        let mut lines = Vec::with_capacity(draft.lines.len());
        let mut movements = Vec::with_capacity(draft.lines.len());

        for line in &draft.lines {
            if matches!(fail, Some(SaleFailPoint::LineItemWrite)) {
                return Err(StoreError::LineItemWrite(injected()));
            }
            lines.push(LineItem {
                id: LineItemId::new(Sequences::next(&mut t.seq.line_item)),
                sale_id: sale.id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });

            if matches!(fail, Some(SaleFailPoint::StockWrite)) {
                return Err(StoreError::StockWrite(injected()));
            }
            let product = match working.entry(line.product_id.as_i64()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    let current = t
                        .products
                        .get(&line.product_id.as_i64())
                        .ok_or(StoreError::NotFound)?;
                    e.insert(current.clone())
                }
            };
            // Write-time re-check: the stock seen here is current, not the
            // validation snapshot.
            if product.stock < line.quantity {
                return Err(StoreError::StockConflict {
                    product_id: line.product_id,
                    available: product.stock,
                    requested: line.quantity,
                });
            }
            product.stock -= line.quantity;
            product.updated_at = now;

            if matches!(fail, Some(SaleFailPoint::MovementWrite)) {
                return Err(StoreError::MovementWrite(injected()));
            }
            let mv = NewMovement::sale_deduction(line.product_id, line.quantity, sale.id);
            movements.push(Movement {
                id: MovementId::new(Sequences::next(&mut t.seq.movement)),
                product_id: mv.product_id,
                delta: mv.delta,
                occurred_at: now,
                description: mv.description,
            });
        }

        for (id, product) in working {
            t.products.insert(id, product);
        }
        t.sales.insert(sale.id.as_i64(), sale.clone());
        t.line_items.extend(lines);
        t.movements.extend(movements);

        Ok(sale)
    }

    async fn sale(&self, id: SaleId) -> Result<Option<(Sale, Vec<LineItem>)>, StoreError> {
        let guard = self.tables.read().unwrap();
        let Some(sale) = guard.sales.get(&id.as_i64()).cloned() else {
            return Ok(None);
        };
        let lines = guard
            .line_items
            .iter()
            .filter(|l| l.sale_id == id)
            .cloned()
            .collect();
        Ok(Some((sale, lines)))
    }

    async fn list_sales(&self) -> Result<Vec<Sale>, StoreError> {
        let guard = self.tables.read().unwrap();
        Ok(guard.sales.values().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_product(name: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            purchase_price: dec!(1.00),
            sale_price: dec!(2.50),
            active: true,
            stock,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn product_crud_round_trip() {
        let store = MemoryStore::new();

        let created = store.insert_product(new_product("Azúcar", 10)).await.unwrap();
        assert_eq!(store.product(created.id).await.unwrap(), Some(created.clone()));

        let patch = ProductPatch {
            stock: Some(20),
            ..ProductPatch::default()
        };
        let updated = store.update_product(created.id, patch).await.unwrap();
        assert_eq!(updated.stock, 20);

        store.delete_product(created.id).await.unwrap();
        assert_eq!(store.product(created.id).await.unwrap(), None);
        assert!(matches!(
            store.delete_product(created.id).await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn product_listing_is_paginated() {
        let store = MemoryStore::new();
        for i in 0..7 {
            store
                .insert_product(new_product(&format!("P{i}"), 1))
                .await
                .unwrap();
        }

        let page = Page { page: 2, page_size: 3 };
        let (items, total) = store.list_products(page).await.unwrap();
        assert_eq!(total, 7);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].name, "P3");
        assert_eq!(page.page_count(total), 3);
    }

    #[tokio::test]
    async fn manual_movement_adjusts_stock_and_appends() {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product("Arroz", 4)).await.unwrap();

        let mv = store
            .register_movement(NewMovement::manual(product.id, 6, "reabastecimiento"))
            .await
            .unwrap();
        assert_eq!(mv.delta, 6);
        assert_eq!(store.product(product.id).await.unwrap().unwrap().stock, 10);

        let log = store.list_movements().await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].id, mv.id);
    }

    #[tokio::test]
    async fn manual_movement_respects_the_stock_floor() {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product("Arroz", 4)).await.unwrap();

        let err = store
            .register_movement(NewMovement::manual(product.id, -5, "ajuste"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::StockConflict {
                available: 4,
                requested: 5,
                ..
            }
        ));

        // Nothing changed.
        assert_eq!(store.product(product.id).await.unwrap().unwrap().stock, 4);
        assert!(store.list_movements().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn movement_for_unknown_product_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .register_movement(NewMovement::manual(ProductId::new(99), 1, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn categories_are_listed_in_insert_order() {
        let store = MemoryStore::new();
        let a = store.insert_category("Bebidas".into(), None).await.unwrap();
        let b = store
            .insert_category("Abarrotes".into(), Some("básicos".into()))
            .await
            .unwrap();

        let all = store.list_categories().await.unwrap();
        assert_eq!(all, vec![a.clone(), b]);
        assert_eq!(store.category(a.id).await.unwrap(), Some(a));
    }
}
