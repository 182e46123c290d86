//! Competence catalog: records, validation, and the derived global status.
//!
//! A competence is a code/name pair carrying an ordered checklist of
//! sub-competences, each with a binary validation status. The catalog never
//! stores the competence's overall status; it is recomputed from the
//! sub-competence list on every read so it can never go stale.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    global_status, progress_percent, CompetenceDraft, CompetenceId, InvalidCompetenceId,
    SubCompetence, ValidationError, ValidationStatus,
};
pub use repository::{
    CompetenceRecord, CompetenceRepository, CompetenceView, DeletedCompetenceView, RepositoryError,
};
pub use router::competence_router;
pub use service::{
    CatalogPage, CatalogQuery, CatalogServiceError, CatalogStats, CompetenceService, SortField,
    SortOrder,
};
