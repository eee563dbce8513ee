pub mod api;
pub mod config;
pub mod cpf;
pub mod error;
pub mod models;
pub mod repo;

use repo::FarmerStore;

/// Shared application state available to all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub farmers: FarmerStore,
}

impl axum::extract::FromRef<AppState> for FarmerStore {
    fn from_ref(state: &AppState) -> Self {
        state.farmers.clone()
    }
}
