use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DeleteOutcome, FarmerRepository};
use crate::{
    cpf::Cpf,
    error::{AppError, Result},
    models::{
        common::PageRequest,
        farmer::{Farmer, FarmerFilter},
    },
};

/// Process-local store used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryFarmerRepository {
    farmers: RwLock<HashMap<Uuid, Farmer>>,
}

impl InMemoryFarmerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FarmerRepository for InMemoryFarmerRepository {
    async fn insert(&self, farmer: &Farmer) -> Result<Farmer> {
        let mut farmers = self.farmers.write().await;
        if farmers.values().any(|f| f.cpf == farmer.cpf) {
            tracing::warn!("Duplicate CPF rejected by in-memory store");
            return Err(AppError::Conflict(
                "A farmer with this CPF already exists".into(),
            ));
        }
        farmers.insert(farmer.id, farmer.clone());
        Ok(farmer.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Farmer>> {
        Ok(self.farmers.read().await.get(&id).cloned())
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Farmer>> {
        let farmers = self.farmers.read().await;
        Ok(farmers.values().find(|f| f.cpf == cpf.as_str()).cloned())
    }

    async fn list(&self, filter: &FarmerFilter, page: &PageRequest) -> Result<(Vec<Farmer>, u64)> {
        let farmers = self.farmers.read().await;
        let mut matches: Vec<&Farmer> = farmers.values().filter(|f| filter.matches(f)).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matches.len() as u64;
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let rows = matches
            .into_iter()
            .skip(skip)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok((rows, total))
    }

    async fn update(&self, farmer: &Farmer) -> Result<Option<Farmer>> {
        let mut farmers = self.farmers.write().await;
        let Some(stored) = farmers.get_mut(&farmer.id) else {
            return Ok(None);
        };
        stored.full_name = farmer.full_name.clone();
        stored.birth_date = farmer.birth_date;
        stored.phone = farmer.phone.clone();
        stored.is_active = farmer.is_active;
        stored.updated_at = farmer.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<DeleteOutcome> {
        let mut farmers = self.farmers.write().await;
        let outcome = match farmers.get(&id).map(Farmer::can_be_deleted) {
            None => DeleteOutcome::NotFound,
            Some(false) => DeleteOutcome::StillActive,
            Some(true) => {
                farmers.remove(&id);
                DeleteOutcome::Deleted
            }
        };
        Ok(outcome)
    }
}
