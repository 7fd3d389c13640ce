use axum::routing::{get, post};
use axum::Router;

pub mod categorias;
pub mod inventarios;
pub mod productos;
pub mod system;
pub mod users;
pub mod ventas;

/// Router for all bearer-authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/users/me", get(users::me))
        .route("/registrar-venta", post(ventas::registrar_venta))
        .nest("/productos", productos::router())
        .nest("/categorias", categorias::router())
        .nest("/inventarios", inventarios::router())
        .nest("/ventas", ventas::router())
}
