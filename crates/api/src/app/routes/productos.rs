use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use puntoventa_core::ProductId;
use puntoventa_infra::{Page, Store};

use crate::app::{dto, errors, AppState};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(remove))
}

fn parse_id(id: &str) -> Result<ProductId, axum::response::Response> {
    id.parse().map_err(errors::domain_error_to_response)
}

/// `pagination[page]` / `pagination[pageSize]`, as the dashboard sends them.
fn page_from_query(query: &HashMap<String, String>) -> Page {
    let defaults = Page::default();
    Page {
        page: query
            .get("pagination[page]")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.page),
        page_size: query
            .get("pagination[pageSize]")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.page_size),
    }
}

pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let page = page_from_query(&query);
    match state.store.list_products(page).await {
        Ok((items, total)) => {
            let items = items.iter().map(dto::producto_to_json).collect();
            (
                StatusCode::OK,
                Json(dto::data_with_pagination(items, page, total)),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.store.product(id).await {
        Ok(Some(product)) => (
            StatusCode::OK,
            Json(dto::data(dto::producto_to_json(&product))),
        )
            .into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "NotFoundError",
            format!("Producto con ID {id} no encontrado."),
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::DataEnvelope<dto::ProductoInput>>,
) -> axum::response::Response {
    let new = body.data.into_new_product();
    if let Err(e) = new.validate() {
        return errors::domain_error_to_response(e);
    }

    match state.store.insert_product(new).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(dto::data(dto::producto_to_json(&product))),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<dto::DataEnvelope<dto::ProductoPatchInput>>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let patch = body.data.into_patch();
    if let Err(e) = patch.validate() {
        return errors::domain_error_to_response(e);
    }

    match state.store.update_product(id, patch).await {
        Ok(product) => (
            StatusCode::OK,
            Json(dto::data(dto::producto_to_json(&product))),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn remove(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.store.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
