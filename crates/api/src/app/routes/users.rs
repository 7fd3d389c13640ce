use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::context::AuthContext;

/// Identity of the authenticated user, derived entirely from token claims.
pub async fn me(Extension(auth): Extension<AuthContext>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": auth.user_id(),
            "username": auth.username(),
            "email": auth.email(),
        })),
    )
        .into_response()
}
