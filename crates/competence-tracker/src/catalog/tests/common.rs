use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::catalog::domain::{CompetenceDraft, CompetenceId, SubCompetence, ValidationStatus};
use crate::catalog::repository::{CompetenceRecord, CompetenceRepository, RepositoryError};
use crate::catalog::service::CompetenceService;

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<CompetenceId, CompetenceRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, record: CompetenceRecord) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
    }
}

impl CompetenceRepository for MemoryRepository {
    fn insert(&self, record: CompetenceRecord) -> Result<CompetenceRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.contains_key(&record.id)
            || guard.values().any(|existing| existing.code == record.code);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: CompetenceRecord) -> Result<CompetenceRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &CompetenceId) -> Result<Option<CompetenceRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_code(&self, code: &str) -> Result<Option<CompetenceRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|record| record.code == code).cloned())
    }

    fn list(&self) -> Result<Vec<CompetenceRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn remove(&self, id: &CompetenceId) -> Result<Option<CompetenceRecord>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id))
    }
}

/// Repository stub that fails every call, for the internal-error paths.
pub(super) struct UnavailableRepository;

impl CompetenceRepository for UnavailableRepository {
    fn insert(&self, _record: CompetenceRecord) -> Result<CompetenceRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn update(&self, _record: CompetenceRecord) -> Result<CompetenceRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn fetch(&self, _id: &CompetenceId) -> Result<Option<CompetenceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn fetch_by_code(&self, _code: &str) -> Result<Option<CompetenceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn list(&self) -> Result<Vec<CompetenceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn remove(&self, _id: &CompetenceId) -> Result<Option<CompetenceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }
}

pub(super) fn sub(name: &str, status: ValidationStatus) -> SubCompetence {
    SubCompetence {
        name: name.to_string(),
        status,
    }
}

pub(super) fn draft(code: &str, name: &str, sub_competences: Vec<SubCompetence>) -> CompetenceDraft {
    CompetenceDraft {
        code: code.to_string(),
        name: name.to_string(),
        sub_competences,
    }
}

pub(super) fn build_service() -> (Arc<CompetenceService<MemoryRepository>>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service = Arc::new(CompetenceService::new(Arc::new(repository.clone())));
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
