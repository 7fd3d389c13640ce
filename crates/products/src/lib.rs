//! `puntoventa-products` — product catalog domain: products and categories.

pub mod category;
pub mod product;

pub use category::Category;
pub use product::{NewProduct, Product, ProductPatch};
