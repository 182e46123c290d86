use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::domain::{
    clean_sub_competences, normalize_code, normalize_name, CompetenceDraft, CompetenceId,
    SubCompetence, ValidationError, ValidationStatus,
};
use super::repository::{CompetenceRecord, CompetenceRepository, RepositoryError};

/// Service composing input validation, the repository, and the catalog
/// projections served by the list endpoint.
pub struct CompetenceService<R> {
    repository: Arc<R>,
}

static COMPETENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_competence_id() -> CompetenceId {
    let id = COMPETENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CompetenceId(format!("cmp-{id:06}"))
}

/// Sortable record fields for the list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Code,
    Name,
}

impl SortField {
    /// Unrecognized parameters fall back to the default sort key.
    pub fn from_param(raw: &str) -> Self {
        match raw.trim() {
            "updatedAt" => Self::UpdatedAt,
            "code" => Self::Code,
            "name" => Self::Name,
            _ => Self::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_param(raw: &str) -> Self {
        match raw.trim() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Parsed list-endpoint parameters.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub status: Option<ValidationStatus>,
    pub sort: SortField,
    pub order: SortOrder,
}

/// Derived-status counts over a catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub validated: usize,
    pub not_validated: usize,
}

/// One page of catalog results plus the statistics over the search scope.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub count: usize,
    pub stats: CatalogStats,
    pub data: Vec<CompetenceRecord>,
}

impl<R> CompetenceService<R>
where
    R: CompetenceRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate and store a new competence, rejecting duplicate codes.
    pub fn create(&self, draft: CompetenceDraft) -> Result<CompetenceRecord, CatalogServiceError> {
        let code = normalize_code(&draft.code)?;
        let name = normalize_name(&draft.name)?;
        let sub_competences = clean_sub_competences(draft.sub_competences)?;

        if self.repository.fetch_by_code(&code)?.is_some() {
            return Err(CatalogServiceError::Repository(RepositoryError::Conflict));
        }

        let now = Utc::now();
        let record = CompetenceRecord {
            id: next_competence_id(),
            code,
            name,
            sub_competences,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Search, sort, and filter the catalog.
    pub fn list(&self, query: &CatalogQuery) -> Result<CatalogPage, CatalogServiceError> {
        let mut records = self.repository.list()?;

        if let Some(search) = query.search.as_deref() {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() {
                records.retain(|record| {
                    record.name.to_lowercase().contains(&needle)
                        || record.code.to_lowercase().contains(&needle)
                });
            }
        }

        records.sort_by(|a, b| {
            let ordering = match query.sort {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Code => a.code.cmp(&b.code),
                SortField::Name => a.name.cmp(&b.name),
            };
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        // Stats cover the whole search scope; the status filter only narrows
        // the returned page.
        let validated = records
            .iter()
            .filter(|record| record.global_status().is_validated())
            .count();
        let stats = CatalogStats {
            total: records.len(),
            validated,
            not_validated: records.len() - validated,
        };

        if let Some(status) = query.status {
            records.retain(|record| record.global_status() == status);
        }

        Ok(CatalogPage {
            count: records.len(),
            stats,
            data: records,
        })
    }

    pub fn get(&self, id: &CompetenceId) -> Result<CompetenceRecord, CatalogServiceError> {
        let record = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Replace a competence's checklist wholesale and bump its update time.
    pub fn evaluate(
        &self,
        id: &CompetenceId,
        sub_competences: Vec<SubCompetence>,
    ) -> Result<CompetenceRecord, CatalogServiceError> {
        let sub_competences = clean_sub_competences(sub_competences)?;

        let mut record = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        record.sub_competences = sub_competences;
        record.updated_at = Utc::now();

        let stored = self.repository.update(record)?;
        Ok(stored)
    }

    pub fn remove(&self, id: &CompetenceId) -> Result<CompetenceRecord, CatalogServiceError> {
        let record = self.repository.remove(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
