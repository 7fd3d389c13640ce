//! HTTP API application wiring (Axum router + store wiring).
//!
//! This folder is structured like:
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use puntoventa_auth::Hs256Jwt;
use puntoventa_infra::{MemoryStore, PostgresStore, SaleRegistrationService, Store};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared application state: the store plus the registration service.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub registration: SaleRegistrationService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let registration = SaleRegistrationService::new(store.clone());
        Self {
            store,
            registration,
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Uses Postgres when `DATABASE_URL` is set, the in-memory store otherwise.
pub async fn build_app(jwt_secret: String) -> anyhow::Result<Router> {
    let store: Arc<dyn Store> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PostgresStore::connect(&url).await?;
            store.run_migrations().await?;
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(build_app_with_store(store, jwt_secret))
}

/// Build the router over an already-constructed store (tests use this with
/// the in-memory store).
pub fn build_app_with_store(store: Arc<dyn Store>, jwt_secret: String) -> Router {
    let jwt = Arc::new(Hs256Jwt::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let state = Arc::new(AppState::new(store));

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(state))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(
            middleware::request_trace_middleware,
        )))
}
