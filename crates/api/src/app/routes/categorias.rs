use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use puntoventa_core::CategoryId;
use puntoventa_infra::Store;

use crate::app::{dto, errors, AppState};

/// Read-only surface; categories are managed outside the dashboard.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_one))
}

pub async fn list(Extension(state): Extension<Arc<AppState>>) -> axum::response::Response {
    match state.store.list_categories().await {
        Ok(items) => {
            let items = items.iter().map(dto::categoria_to_json).collect();
            (StatusCode::OK, Json(dto::data(items))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match state.store.category(id).await {
        Ok(Some(category)) => (
            StatusCode::OK,
            Json(dto::data(dto::categoria_to_json(&category))),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
