use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use puntoventa_core::DomainError;
use puntoventa_infra::StoreError;
use puntoventa_sales::{InvalidSaleRequest, RegistrationError};

/// Error envelope the dashboard expects:
/// `{ "error": { "status", "name", "message" } }`.
pub fn json_error(
    status: StatusCode,
    name: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": {
                "status": status.as_u16(),
                "name": name,
                "message": message.into(),
            }
        })),
    )
        .into_response()
}

/// Map sale registration outcomes to HTTP statuses. User-facing messages
/// stay in the wording the dashboard already displays.
pub fn registration_error_to_response(err: RegistrationError) -> axum::response::Response {
    match err {
        RegistrationError::InvalidRequest(InvalidSaleRequest::Empty) => json_error(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "No hay productos en la venta.",
        ),
        RegistrationError::InvalidRequest(InvalidSaleRequest::NonPositiveQuantity(id)) => {
            json_error(
                StatusCode::BAD_REQUEST,
                "ValidationError",
                format!("La cantidad debe ser mayor a cero para el producto con ID {id}."),
            )
        }
        RegistrationError::ProductNotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "NotFoundError",
            format!("Producto con ID {id} no encontrado."),
        ),
        RegistrationError::InsufficientStock {
            available,
            requested,
            ..
        } => json_error(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            format!("Stock insuficiente para el producto. Stock: {available}, Solicitado: {requested}"),
        ),
        RegistrationError::Processing => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            "Error interno al procesar la venta.",
        ),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "ValidationError", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "ValidationError", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "ValidationError", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "ConflictError", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found"),
        StoreError::StockConflict { available, .. } => json_error(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            format!("El movimiento dejaría el stock en negativo. Stock: {available}"),
        ),
        other => {
            tracing::error!(error = ?other, "store operation failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal Server Error",
            )
        }
    }
}
