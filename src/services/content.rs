//! Content authoring service
//!
//! Shared by the CLI and any embedding application. Every mutating call
//! invalidates the serving cache once the repository call returns, whether
//! or not it actually changed anything.

use std::sync::Arc;

use tracing::info;

use crate::errors::{PromoError, Result};
use crate::services::serving::ServingService;
use crate::storage::{
    ContentRepository, ContentStatus, ContentUnit, ContentUnitPatch, NewContentUnit,
};

pub struct ContentService {
    repository: Arc<ContentRepository>,
    serving: Arc<ServingService>,
}

impl ContentService {
    pub fn new(repository: Arc<ContentRepository>, serving: Arc<ServingService>) -> Self {
        Self {
            repository,
            serving,
        }
    }

    pub fn list(&self) -> Vec<ContentUnit> {
        self.repository.list()
    }

    /// Filter by status; `None` returns everything
    pub fn list_by_status(&self, status: Option<ContentStatus>) -> Vec<ContentUnit> {
        let units = self.repository.list();
        match status {
            Some(status) => units.into_iter().filter(|u| u.status == status).collect(),
            None => units,
        }
    }

    pub fn get(&self, id: &str) -> Option<ContentUnit> {
        self.repository.get_by_id(id)
    }

    /// Like [`get`](Self::get) but a missing id is an error
    pub fn require(&self, id: &str) -> Result<ContentUnit> {
        self.repository
            .get_by_id(id)
            .ok_or_else(|| PromoError::not_found(format!("Content unit '{}' not found", id)))
    }

    pub fn create(&self, new_unit: NewContentUnit) -> Result<ContentUnit> {
        let result = self.repository.create(new_unit);
        self.serving.invalidate();
        result
    }

    pub fn update(&self, id: &str, patch: ContentUnitPatch) -> Result<Vec<ContentUnit>> {
        let result = self.repository.update(id, patch);
        self.serving.invalidate();
        result
    }

    pub fn soft_delete(&self, id: &str) -> Result<Vec<ContentUnit>> {
        let result = self.repository.soft_delete(id);
        self.serving.invalidate();
        if result.is_ok() {
            info!("Content unit disabled: {}", id);
        }
        result
    }

    pub fn serving(&self) -> &Arc<ServingService> {
        &self.serving
    }
}
