use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    global_status, progress_percent, CompetenceId, SubCompetence, ValidationStatus,
};

/// Stored catalog entry. Global status and progression are intentionally
/// absent: both are projections of `sub_competences` recomputed on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetenceRecord {
    pub id: CompetenceId,
    pub code: String,
    pub name: String,
    pub sub_competences: Vec<SubCompetence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompetenceRecord {
    pub fn global_status(&self) -> ValidationStatus {
        global_status(&self.sub_competences)
    }

    pub fn progression(&self) -> u8 {
        progress_percent(&self.sub_competences)
    }

    /// API projection of the record, with the derived fields attached.
    pub fn view(&self) -> CompetenceView {
        CompetenceView {
            id: self.id.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
            sub_competences: self.sub_competences.clone(),
            global_status: self.global_status(),
            progression: self.progression(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Echo payload returned when the record is deleted.
    pub fn deleted_view(&self) -> DeletedCompetenceView {
        DeletedCompetenceView {
            id: self.id.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

/// Storage abstraction so the service and router can be exercised against an
/// in-memory store.
pub trait CompetenceRepository: Send + Sync {
    fn insert(&self, record: CompetenceRecord) -> Result<CompetenceRecord, RepositoryError>;
    fn update(&self, record: CompetenceRecord) -> Result<CompetenceRecord, RepositoryError>;
    fn fetch(&self, id: &CompetenceId) -> Result<Option<CompetenceRecord>, RepositoryError>;
    fn fetch_by_code(&self, code: &str) -> Result<Option<CompetenceRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<CompetenceRecord>, RepositoryError>;
    fn remove(&self, id: &CompetenceId) -> Result<Option<CompetenceRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Serialized representation of a competence, derived fields included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetenceView {
    pub id: CompetenceId,
    pub code: String,
    pub name: String,
    pub sub_competences: Vec<SubCompetence>,
    pub global_status: ValidationStatus,
    pub progression: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal echo of a removed record.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedCompetenceView {
    pub id: CompetenceId,
    pub code: String,
    pub name: String,
}
