pub mod extract;
pub mod farmers;

use axum::{Json, Router, routing::{get, patch}};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Farmers
        .route("/farmers", get(farmers::list).post(farmers::create))
        .route("/farmers/cpf/:cpf", get(farmers::get_by_cpf))
        .route(
            "/farmers/:id",
            get(farmers::get_one).patch(farmers::update).delete(farmers::delete),
        )
        .route("/farmers/:id/activate", patch(farmers::activate))
        .route("/farmers/:id/deactivate", patch(farmers::deactivate))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
