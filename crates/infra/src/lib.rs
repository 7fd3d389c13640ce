//! `puntoventa-infra` — persistence and orchestration.
//!
//! The [`store::Store`] trait covers the persistent collections the API
//! serves; [`store::MemoryStore`] backs dev/test, [`store::PostgresStore`]
//! backs production. [`registration::SaleRegistrationService`] drives the
//! sale transaction: validation first, then the store's atomic write
//! sequence.

pub mod registration;
pub mod store;

pub use registration::SaleRegistrationService;
pub use store::{MemoryStore, Page, PostgresStore, Store, StoreError};
