use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use puntoventa_core::{MovementId, ProductId};
use puntoventa_infra::Store;
use puntoventa_inventory::NewMovement;

use crate::app::{dto, errors, AppState};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one))
}

pub async fn list(Extension(state): Extension<Arc<AppState>>) -> axum::response::Response {
    match state.store.list_movements().await {
        Ok(items) => {
            let items = items.iter().map(dto::inventario_to_json).collect();
            (StatusCode::OK, Json(dto::data(items))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MovementId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match state.store.movement(id).await {
        Ok(Some(movement)) => (
            StatusCode::OK,
            Json(dto::data(dto::inventario_to_json(&movement))),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Manual movement (restock/correction). The stock floor is enforced by the
/// store's conditional update.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::DataEnvelope<dto::InventarioInput>>,
) -> axum::response::Response {
    let input = body.data;
    let new = NewMovement::manual(
        ProductId::new(input.producto),
        input.cantidad_movida,
        input.descripcion_mov,
    );
    if let Err(e) = new.validate() {
        return errors::domain_error_to_response(e);
    }

    match state.store.register_movement(new).await {
        Ok(movement) => (
            StatusCode::CREATED,
            Json(dto::data(dto::inventario_to_json(&movement))),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
