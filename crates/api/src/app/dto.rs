use rust_decimal::Decimal;
use serde::Deserialize;

use puntoventa_core::{CategoryId, ProductId, UserId};
use puntoventa_inventory::Movement;
use puntoventa_products::{Category, NewProduct, Product, ProductPatch};
use puntoventa_sales::{LineItem, LineItemRequest, Sale, SaleRequest};

use puntoventa_infra::Page;

// -------------------------
// Request DTOs
// -------------------------

/// Strapi-style write envelope: `{ "data": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Body of `POST /registrar-venta`, exactly as the dashboard sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarVentaRequest {
    pub usuario_id: i64,
    pub productos_vendidos: Vec<ProductoVendido>,
}

#[derive(Debug, Deserialize)]
pub struct ProductoVendido {
    pub id: i64,
    pub cantidad: i64,
}

impl RegistrarVentaRequest {
    pub fn into_sale_request(self) -> SaleRequest {
        SaleRequest {
            buyer_id: UserId::new(self.usuario_id),
            items: self
                .productos_vendidos
                .into_iter()
                .map(|item| LineItemRequest {
                    product_id: ProductId::new(item.id),
                    quantity: item.cantidad,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductoInput {
    #[serde(rename = "Nombre")]
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_compra: Decimal,
    pub precio_venta: Decimal,
    #[serde(default = "default_true")]
    pub estado: bool,
    #[serde(default)]
    pub stock_actual: i64,
    pub categoria: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl ProductoInput {
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.nombre,
            description: self.descripcion,
            purchase_price: self.precio_compra,
            sale_price: self.precio_venta,
            active: self.estado,
            stock: self.stock_actual,
            category_id: self.categoria.map(CategoryId::new),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductoPatchInput {
    #[serde(rename = "Nombre")]
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub precio_compra: Option<Decimal>,
    pub precio_venta: Option<Decimal>,
    pub estado: Option<bool>,
    pub stock_actual: Option<i64>,
    pub categoria: Option<i64>,
}

impl ProductoPatchInput {
    pub fn into_patch(self) -> ProductPatch {
        ProductPatch {
            name: self.nombre,
            description: self.descripcion,
            purchase_price: self.precio_compra,
            sale_price: self.precio_venta,
            active: self.estado,
            stock: self.stock_actual,
            category_id: self.categoria.map(CategoryId::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InventarioInput {
    pub producto: i64,
    pub cantidad_movida: i64,
    pub descripcion_mov: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn producto_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id,
        "Nombre": p.name,
        "descripcion": p.description,
        "precio_compra": p.purchase_price,
        "precio_venta": p.sale_price,
        "estado": p.active,
        "stock_actual": p.stock,
        "categoria": p.category_id,
        "fecha_creacion": p.created_at.to_rfc3339(),
        "fecha_actualizacion": p.updated_at.to_rfc3339(),
    })
}

pub fn categoria_to_json(c: &Category) -> serde_json::Value {
    serde_json::json!({
        "id": c.id,
        "nombre": c.name,
        "descripcion": c.description,
    })
}

pub fn inventario_to_json(m: &Movement) -> serde_json::Value {
    serde_json::json!({
        "id": m.id,
        "producto": m.product_id,
        "cantidad_movida": m.delta,
        "fecha_movimiento": m.occurred_at.to_rfc3339(),
        "descripcion_mov": m.description,
    })
}

pub fn venta_to_json(s: &Sale) -> serde_json::Value {
    serde_json::json!({
        "id": s.id,
        "usuario_id": s.buyer_id,
        "total": s.total,
        "fecha_venta": s.created_at.to_rfc3339(),
    })
}

pub fn venta_with_detalle_to_json(s: &Sale, lines: &[LineItem]) -> serde_json::Value {
    let mut value = venta_to_json(s);
    value["detalle_venta"] = lines.iter().map(detalle_to_json).collect();
    value
}

pub fn detalle_to_json(l: &LineItem) -> serde_json::Value {
    serde_json::json!({
        "id": l.id,
        "producto": l.product_id,
        "cantidad": l.quantity,
        "precio_unitario": l.unit_price,
        "subtotal": l.subtotal(),
    })
}

/// Success envelope: `{ "data": ... }`.
pub fn data(value: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "data": value })
}

/// Success envelope with the pagination block the dashboard reads.
pub fn data_with_pagination(
    value: serde_json::Value,
    page: Page,
    total: u64,
) -> serde_json::Value {
    serde_json::json!({
        "data": value,
        "meta": {
            "pagination": {
                "page": page.page,
                "pageSize": page.page_size,
                "pageCount": page.page_count(total),
                "total": total,
            }
        }
    })
}
