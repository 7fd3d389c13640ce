//! `puntoventa-sales` — sale domain: headers, line items, request validation,
//! price-snapshot totals, and the registration error taxonomy.
//!
//! Everything here is pure; the store-facing orchestration lives in infra.

pub mod error;
pub mod request;
pub mod sale;

pub use error::{InvalidSaleRequest, RegistrationError};
pub use request::{LineItemRequest, SaleRequest};
pub use sale::{LineItem, PricedLine, Sale, SaleDraft};
