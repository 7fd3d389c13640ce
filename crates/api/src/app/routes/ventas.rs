use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use puntoventa_core::SaleId;
use puntoventa_infra::Store;

use crate::app::{dto, errors, AppState};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_one))
}

/// `POST /registrar-venta`: the sale registration transaction.
///
/// 200 with the created sale; 400 for an empty item list or insufficient
/// stock; 404 for an unknown product; 500 for a write-phase failure.
pub async fn registrar_venta(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::RegistrarVentaRequest>,
) -> axum::response::Response {
    match state
        .registration
        .register_sale(body.into_sale_request())
        .await
    {
        Ok(sale) => (StatusCode::OK, Json(dto::data(dto::venta_to_json(&sale)))).into_response(),
        Err(e) => errors::registration_error_to_response(e),
    }
}

pub async fn list(Extension(state): Extension<Arc<AppState>>) -> axum::response::Response {
    match state.store.list_sales().await {
        Ok(items) => {
            let items = items.iter().map(dto::venta_to_json).collect();
            (StatusCode::OK, Json(dto::data(items))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match state.store.sale(id).await {
        Ok(Some((sale, lines))) => (
            StatusCode::OK,
            Json(dto::data(dto::venta_with_detalle_to_json(&sale, &lines))),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
