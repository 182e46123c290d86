use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use competence_tracker::catalog::{
    CatalogServiceError, CompetenceDraft, CompetenceId, CompetenceRecord, CompetenceRepository,
    CompetenceService, RepositoryError, SubCompetence, ValidationStatus,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local catalog store. The repository trait keeps the service and
/// router oblivious to where records actually live.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCompetenceRepository {
    records: Arc<Mutex<HashMap<CompetenceId, CompetenceRecord>>>,
}

impl CompetenceRepository for InMemoryCompetenceRepository {
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

fn item(name: &str, validated: bool) -> SubCompetence {
    SubCompetence {
        name: name.to_string(),
        status: if validated {
            ValidationStatus::Validated
        } else {
            ValidationStatus::NotValidated
        },
    }
}

fn starter_drafts() -> Vec<CompetenceDraft> {
    vec![
        CompetenceDraft {
            code: "C1".to_string(),
            name: "Set up and configure the project working environment".to_string(),
            sub_competences: vec![
                item("Master Git and GitHub workflows", true),
                item("Configure the development environment", true),
                item("Manage project dependencies", false),
            ],
        },
        CompetenceDraft {
            code: "C2".to_string(),
            name: "Mock up web and mobile user interfaces".to_string(),
            sub_competences: vec![
                item("Produce mockups following UI/UX principles", false),
                item("Use a dedicated mockup tool", false),
            ],
        },
        CompetenceDraft {
            code: "C3".to_string(),
            name: "Build static web and mobile interfaces".to_string(),
            sub_competences: vec![
                item("Make pages responsive with media queries", true),
                item("Style pages with the box model and typography", true),
                item("Position elements on the page", true),
                item("Lay out content with flexbox and grid", true),
                item("Build forms with native elements", false),
            ],
        },
        CompetenceDraft {
            code: "C4".to_string(),
            name: "Develop the dynamic part of user interfaces".to_string(),
            sub_competences: vec![
                item("Manipulate variables, objects, and arrays", true),
                item("Use conditionals, loops, and functions", true),
                item("React to DOM events", false),
            ],
        },
    ]
}

/// Preload the catalog with the starter competence set used for demos and
/// local development.
pub(crate) fn seed_catalog<R>(
    service: &CompetenceService<R>,
) -> Result<usize, CatalogServiceError>
where
    R: CompetenceRepository + 'static,
{
    let drafts = starter_drafts();
    let count = drafts.len();
    for draft in drafts {
        service.create(draft)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use competence_tracker::catalog::CatalogQuery;

    #[test]
    fn seed_loads_the_starter_catalog() {
        let repository = Arc::new(InMemoryCompetenceRepository::default());
        let service = CompetenceService::new(repository);

        let count = seed_catalog(&service).expect("seed succeeds");
        assert_eq!(count, 4);

        let page = service
            .list(&CatalogQuery::default())
            .expect("list succeeds");
        assert_eq!(page.stats.total, 4);
        // C1 (2/3) and C3 (4/5) carry a validated majority.
        assert_eq!(page.stats.validated, 2);
    }

    #[test]
    fn seeding_twice_conflicts_on_codes() {
        let repository = Arc::new(InMemoryCompetenceRepository::default());
        let service = CompetenceService::new(repository);

        seed_catalog(&service).expect("first seed succeeds");
        assert!(seed_catalog(&service).is_err());
    }
}
