//! PostgreSQL-backed store.
//!
//! The sale write sequence and manual movements run inside a single
//! transaction; stock decrements are conditional (`... AND stock_actual >=
//! $n`), so the stock check is repeated at write time and a lost race
//! surfaces as [`StoreError::StockConflict`] instead of negative stock.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use puntoventa_core::{CategoryId, LineItemId, MovementId, ProductId, SaleId, UserId};
use puntoventa_inventory::{Movement, NewMovement};
use puntoventa_products::{Category, NewProduct, Product, ProductPatch};
use puntoventa_sales::{LineItem, Sale, SaleDraft};

use super::{Page, Store, StoreError};

/// PostgreSQL [`Store`] implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(StoreError::backend)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the schema migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn row_to_product(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("nombre")?,
        description: row.try_get("descripcion")?,
        purchase_price: row.try_get("precio_compra")?,
        sale_price: row.try_get("precio_venta")?,
        active: row.try_get("estado")?,
        stock: row.try_get("stock_actual")?,
        category_id: row
            .try_get::<Option<i64>, _>("categoria_id")?
            .map(CategoryId::new),
        created_at: row.try_get("fecha_creacion")?,
        updated_at: row.try_get("fecha_actualizacion")?,
    })
}

fn row_to_category(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        name: row.try_get("nombre")?,
        description: row.try_get("descripcion")?,
    })
}

fn row_to_movement(row: &PgRow) -> Result<Movement, sqlx::Error> {
    Ok(Movement {
        id: MovementId::new(row.try_get("id")?),
        product_id: ProductId::new(row.try_get("producto_id")?),
        delta: row.try_get("cantidad_movida")?,
        occurred_at: row.try_get("fecha_movimiento")?,
        description: row.try_get("descripcion_mov")?,
    })
}

fn row_to_sale(row: &PgRow) -> Result<Sale, sqlx::Error> {
    Ok(Sale {
        id: SaleId::new(row.try_get("id")?),
        buyer_id: UserId::new(row.try_get("usuario_id")?),
        total: row.try_get("total")?,
        created_at: row.try_get("fecha_venta")?,
    })
}

fn row_to_line_item(row: &PgRow) -> Result<LineItem, sqlx::Error> {
    Ok(LineItem {
        id: LineItemId::new(row.try_get("id")?),
        sale_id: SaleId::new(row.try_get("venta_id")?),
        product_id: ProductId::new(row.try_get("producto_id")?),
        quantity: row.try_get("cantidad")?,
        unit_price: row.try_get("precio_unitario")?,
    })
}

const PRODUCT_COLUMNS: &str = "id, nombre, descripcion, precio_compra, precio_venta, estado, \
                               stock_actual, categoria_id, fecha_creacion, fecha_actualizacion";

#[async_trait]
impl Store for PostgresStore {
    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let sql = format!(
            "INSERT INTO productos \
             (nombre, descripcion, precio_compra, precio_venta, estado, stock_actual, categoria_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.purchase_price)
            .bind(new.sale_price)
            .bind(new.active)
            .bind(new.stock)
            .bind(new.category_id.map(|c| c.as_i64()))
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        row_to_product(&row).map_err(StoreError::backend)
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM productos WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        row.as_ref()
            .map(row_to_product)
            .transpose()
            .map_err(StoreError::backend)
    }

    async fn list_products(&self, page: Page) -> Result<(Vec<Product>, u64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM productos ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(i64::from(page.page_size))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        let items = rows
            .iter()
            .map(row_to_product)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::backend)?;
        Ok((items, total as u64))
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM productos WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::NotFound)?;
        let mut product = row_to_product(&row).map_err(StoreError::backend)?;
        patch.apply(&mut product, Utc::now());

        sqlx::query(
            "UPDATE productos SET nombre = $2, descripcion = $3, precio_compra = $4, \
             precio_venta = $5, estado = $6, stock_actual = $7, categoria_id = $8, \
             fecha_actualizacion = $9 WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.purchase_price)
        .bind(product.sale_price)
        .bind(product.active)
        .bind(product.stock)
        .bind(product.category_id.map(|c| c.as_i64()))
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM productos WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Category, StoreError> {
        let row = sqlx::query(
            "INSERT INTO categorias (nombre, descripcion) VALUES ($1, $2) \
             RETURNING id, nombre, descripcion",
        )
        .bind(&name)
        .bind(&description)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        row_to_category(&row).map_err(StoreError::backend)
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT id, nombre, descripcion FROM categorias WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        row.as_ref()
            .map(row_to_category)
            .transpose()
            .map_err(StoreError::backend)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, nombre, descripcion FROM categorias ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        rows.iter()
            .map(row_to_category)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::backend)
    }

    async fn register_movement(&self, new: NewMovement) -> Result<Movement, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let updated = sqlx::query(
            "UPDATE productos SET stock_actual = stock_actual + $2, fecha_actualizacion = NOW() \
             WHERE id = $1 AND stock_actual + $2 >= 0",
        )
        .bind(new.product_id.as_i64())
        .bind(new.delta)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::StockWrite(e.into()))?;

        if updated.rows_affected() == 0 {
            let stock: Option<i64> =
                sqlx::query_scalar("SELECT stock_actual FROM productos WHERE id = $1")
                    .bind(new.product_id.as_i64())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(StoreError::backend)?;
            return match stock {
                None => Err(StoreError::NotFound),
                Some(available) => Err(StoreError::StockConflict {
                    product_id: new.product_id,
                    available,
                    requested: -new.delta,
                }),
            };
        }

        let row = sqlx::query(
            "INSERT INTO inventarios (producto_id, cantidad_movida, descripcion_mov) \
             VALUES ($1, $2, $3) \
             RETURNING id, producto_id, cantidad_movida, fecha_movimiento, descripcion_mov",
        )
        .bind(new.product_id.as_i64())
        .bind(new.delta)
        .bind(&new.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::MovementWrite(e.into()))?;
        let movement = row_to_movement(&row).map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(movement)
    }

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        let row = sqlx::query(
            "SELECT id, producto_id, cantidad_movida, fecha_movimiento, descripcion_mov \
             FROM inventarios WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        row.as_ref()
            .map(row_to_movement)
            .transpose()
            .map_err(StoreError::backend)
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, producto_id, cantidad_movida, fecha_movimiento, descripcion_mov \
             FROM inventarios ORDER BY fecha_movimiento DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        rows.iter()
            .map(row_to_movement)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::backend)
    }

    async fn execute_sale(&self, draft: SaleDraft) -> Result<Sale, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let sale_row = sqlx::query(
            "INSERT INTO ventas (usuario_id, total) VALUES ($1, $2) \
             RETURNING id, usuario_id, total, fecha_venta",
        )
        .bind(draft.buyer_id.as_i64())
        .bind(draft.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::SaleWrite(e.into()))?;
        let sale = row_to_sale(&sale_row).map_err(StoreError::backend)?;

        for line in &draft.lines {
            sqlx::query(
                "INSERT INTO detalle_ventas (venta_id, producto_id, cantidad, precio_unitario, subtotal) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(sale.id.as_i64())
            .bind(line.product_id.as_i64())
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal())
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::LineItemWrite(e.into()))?;

            // Conditional decrement: the stock check is repeated here, so a
            // sale that lost the race since validation aborts the whole
            // transaction instead of driving stock negative.
            let updated = sqlx::query(
                "UPDATE productos SET stock_actual = stock_actual - $2, fecha_actualizacion = NOW() \
                 WHERE id = $1 AND stock_actual >= $2",
            )
            .bind(line.product_id.as_i64())
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::StockWrite(e.into()))?;

            if updated.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT stock_actual FROM productos WHERE id = $1")
                        .bind(line.product_id.as_i64())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(StoreError::backend)?
                        .unwrap_or(0);
                // Dropping the transaction rolls back the header and any
                // prior line writes.
                return Err(StoreError::StockConflict {
                    product_id: line.product_id,
                    available,
                    requested: line.quantity,
                });
            }

            let mv = NewMovement::sale_deduction(line.product_id, line.quantity, sale.id);
            sqlx::query(
                "INSERT INTO inventarios (producto_id, cantidad_movida, descripcion_mov) \
                 VALUES ($1, $2, $3)",
            )
            .bind(mv.product_id.as_i64())
            .bind(mv.delta)
            .bind(&mv.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::MovementWrite(e.into()))?;
        }

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(sale)
    }

    async fn sale(&self, id: SaleId) -> Result<Option<(Sale, Vec<LineItem>)>, StoreError> {
        let Some(row) =
            sqlx::query("SELECT id, usuario_id, total, fecha_venta FROM ventas WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?
        else {
            return Ok(None);
        };
        let sale = row_to_sale(&row).map_err(StoreError::backend)?;

        let rows = sqlx::query(
            "SELECT id, venta_id, producto_id, cantidad, precio_unitario \
             FROM detalle_ventas WHERE venta_id = $1 ORDER BY id",
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        let lines = rows
            .iter()
            .map(row_to_line_item)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::backend)?;

        Ok(Some((sale, lines)))
    }

    async fn list_sales(&self) -> Result<Vec<Sale>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, usuario_id, total, fecha_venta FROM ventas \
             ORDER BY fecha_venta DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        rows.iter()
            .map(row_to_sale)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::backend)
    }
}
