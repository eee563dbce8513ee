#![allow(dead_code)]
use std::{net::SocketAddr, sync::Arc};

use farmer_registry::{api, repo::InMemoryFarmerRepository, AppState};

/// Known-valid CPFs, formatted the way the UI sends them.
pub const CPF_A: &str = "529.982.247-25";
pub const CPF_B: &str = "123.456.789-09";
pub const CPF_C: &str = "111.444.777-35";
pub const CPF_D: &str = "935.411.347-80";

/// Spin up a real Axum server on a random port backed by a fresh in-memory
/// store, so every test starts from an empty registry.
pub async fn setup_test_app() -> SocketAddr {
    let state = AppState {
        farmers: Arc::new(InMemoryFarmerRepository::new()),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Build a reqwest client (reusable across requests in a test).
pub fn http_client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Create a farmer via the API and return the response body.
pub async fn create_farmer(addr: SocketAddr, body: serde_json::Value) -> serde_json::Value {
    let resp = http_client()
        .post(format!("http://{}/farmers", addr))
        .json(&body)
        .send()
        .await
        .expect("Create request failed");

    assert_eq!(resp.status(), 201, "Create should return 201");
    resp.json().await.expect("Failed to parse create response")
}

/// Create a farmer with only the required fields.
pub async fn create_named(addr: SocketAddr, name: &str, cpf: &str) -> serde_json::Value {
    create_farmer(addr, serde_json::json!({ "fullName": name, "cpf": cpf })).await
}

pub async fn deactivate(addr: SocketAddr, id: &str) {
    let resp = http_client()
        .patch(format!("http://{}/farmers/{}/deactivate", addr, id))
        .send()
        .await
        .expect("Deactivate request failed");
    assert_eq!(resp.status(), 200, "Deactivate should return 200");
}
