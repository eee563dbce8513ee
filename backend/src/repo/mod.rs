//! Farmer storage.
//!
//! Handlers only see `FarmerStore`; the concrete backend is picked at
//! startup from configuration. Both backends enforce CPF uniqueness
//! themselves, so a racing duplicate insert still ends up as a conflict.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryFarmerRepository;
pub use postgres::PgFarmerRepository;

use crate::{
    cpf::Cpf,
    error::Result,
    models::{
        common::PageRequest,
        farmer::{Farmer, FarmerFilter},
    },
};

pub type FarmerStore = Arc<dyn FarmerRepository>;

/// Result of a delete that only removes inactive records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    StillActive,
    NotFound,
}

#[async_trait]
pub trait FarmerRepository: Send + Sync {
    /// Persists a new record. Fails with a conflict if the CPF is taken.
    async fn insert(&self, farmer: &Farmer) -> Result<Farmer>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Farmer>>;

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Farmer>>;

    /// One page of matches, newest first, plus the total match count.
    async fn list(&self, filter: &FarmerFilter, page: &PageRequest) -> Result<(Vec<Farmer>, u64)>;

    /// Overwrites the mutable fields. Returns `None` if the id is gone.
    async fn update(&self, farmer: &Farmer) -> Result<Option<Farmer>>;

    /// Removes the record only if it is inactive, checked atomically with
    /// the removal.
    async fn delete(&self, id: Uuid) -> Result<DeleteOutcome>;
}
