use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use puntoventa_auth::JwtClaims;
use puntoventa_core::UserId;
use puntoventa_infra::MemoryStore;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Same router as prod, but over the in-memory store and bound to an
        // ephemeral port.
        let store = Arc::new(MemoryStore::new());
        let app = puntoventa_api::app::build_app_with_store(store, jwt_secret.to_string());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, user_id: i64) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(user_id),
        username: "cajero".to_string(),
        email: "cajero@example.com".to_string(),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_producto(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    nombre: &str,
    precio_venta: f64,
    stock: i64,
) -> i64 {
    let res = client
        .post(format!("{}/productos", base_url))
        .bearer_auth(token)
        .json(&json!({
            "data": {
                "Nombre": nombre,
                "precio_compra": precio_venta / 2.0,
                "precio_venta": precio_venta,
                "stock_actual": stock,
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/users/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Health stays public.
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_returns_the_token_identity() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 42);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/users/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], json!(42));
    assert_eq!(body["username"], "cajero");
    assert_eq!(body["email"], "cajero@example.com");
}

#[tokio::test]
async fn producto_crud_lifecycle() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 1);
    let client = reqwest::Client::new();

    let id = create_producto(&client, &srv.base_url, &token, "Café molido", 10.0, 5).await;

    // Read back.
    let res = client
        .get(format!("{}/productos/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["Nombre"], "Café molido");
    assert_eq!(body["data"]["stock_actual"], json!(5));
    assert_eq!(body["data"]["estado"], json!(true));

    // List carries the pagination block.
    let res = client
        .get(format!(
            "{}/productos?pagination[page]=1&pagination[pageSize]=10",
            srv.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["pagination"]["total"], json!(1));

    // Update.
    let res = client
        .put(format!("{}/productos/{}", srv.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "data": { "precio_venta": 12.5 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["precio_venta"], json!(12.5));

    // Delete, then the read is a 404.
    let res = client
        .delete(format!("{}/productos/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/productos/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn producto_create_rejects_invalid_input() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 1);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/productos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "data": {
                "Nombre": "   ",
                "precio_compra": 1.0,
                "precio_venta": 2.0,
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"]["name"], "ValidationError");
}

#[tokio::test]
async fn registrar_venta_happy_path() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 1);
    let client = reqwest::Client::new();

    let cafe = create_producto(&client, &srv.base_url, &token, "Café", 10.0, 10).await;
    let azucar = create_producto(&client, &srv.base_url, &token, "Azúcar", 5.0, 10).await;

    let res = client
        .post(format!("{}/registrar-venta", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "usuarioId": 1,
            "productosVendidos": [
                { "id": cafe, "cantidad": 2 },
                { "id": azucar, "cantidad": 1 },
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["total"], json!(25.0));
    let venta_id = body["data"]["id"].as_i64().unwrap();

    // Stock was decremented.
    let res = client
        .get(format!("{}/productos/{}", srv.base_url, cafe))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["stock_actual"], json!(8));

    // The sale carries its line items.
    let res = client
        .get(format!("{}/ventas/{}", srv.base_url, venta_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let detalle = body["data"]["detalle_venta"].as_array().unwrap();
    assert_eq!(detalle.len(), 2);
    assert_eq!(detalle[0]["cantidad"], json!(2));
    assert_eq!(detalle[0]["precio_unitario"], json!(10.0));
    assert_eq!(detalle[0]["subtotal"], json!(20.0));

    // One movement per line item, newest first, referencing the sale.
    let res = client
        .get(format!("{}/inventarios", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let movimientos = body["data"].as_array().unwrap();
    assert_eq!(movimientos.len(), 2);
    assert_eq!(movimientos[0]["cantidad_movida"], json!(-1));
    assert!(movimientos[0]["descripcion_mov"]
        .as_str()
        .unwrap()
        .contains(&venta_id.to_string()));
}

#[tokio::test]
async fn registrar_venta_rejects_empty_item_list() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 1);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/registrar-venta", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "usuarioId": 1, "productosVendidos": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"]["message"], "No hay productos en la venta.");
}

#[tokio::test]
async fn registrar_venta_rejects_unknown_product() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 1);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/registrar-venta", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "usuarioId": 1,
            "productosVendidos": [{ "id": 999, "cantidad": 1 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"]["message"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn registrar_venta_rejects_insufficient_stock() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 1);
    let client = reqwest::Client::new();

    let cafe = create_producto(&client, &srv.base_url, &token, "Café", 10.0, 5).await;

    let res = client
        .post(format!("{}/registrar-venta", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "usuarioId": 1,
            "productosVendidos": [{ "id": cafe, "cantidad": 10 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("Stock: 5"));
    assert!(message.contains("Solicitado: 10"));

    // No side effects.
    let res = client
        .get(format!("{}/productos/{}", srv.base_url, cafe))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["stock_actual"], json!(5));
}

#[tokio::test]
async fn manual_movement_cannot_drive_stock_negative() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, 1);
    let client = reqwest::Client::new();

    let cafe = create_producto(&client, &srv.base_url, &token, "Café", 10.0, 3).await;

    let res = client
        .post(format!("{}/inventarios", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "data": {
                "producto": cafe,
                "cantidad_movida": -5,
                "descripcion_mov": "ajuste de inventario"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A restock within the floor is accepted and logged.
    let res = client
        .post(format!("{}/inventarios", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "data": {
                "producto": cafe,
                "cantidad_movida": 7,
                "descripcion_mov": "reabastecimiento"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/productos/{}", srv.base_url, cafe))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["stock_actual"], json!(10));
}
