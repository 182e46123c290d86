use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for catalog records. The wire format is `cmp-` followed
/// by a decimal sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompetenceId(pub String);

impl CompetenceId {
    /// Parse a path segment into an identifier, rejecting anything that does
    /// not look like an id this service hands out.
    pub fn parse(raw: &str) -> Result<Self, InvalidCompetenceId> {
        let digits = raw.strip_prefix("cmp-").unwrap_or("");
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidCompetenceId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }
}

impl fmt::Display for CompetenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raised when a path segment does not match the identifier format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid competence id")]
pub struct InvalidCompetenceId(pub String);

/// Binary validation state carried by every sub-competence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ValidationStatus {
    #[serde(rename = "validated")]
    Validated,
    #[default]
    #[serde(rename = "not-validated")]
    NotValidated,
}

impl ValidationStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Validated => "validated",
            Self::NotValidated => "not-validated",
        }
    }

    pub fn is_validated(self) -> bool {
        matches!(self, Self::Validated)
    }

    /// Strict parse used for the list endpoint's status filter, where an
    /// unrecognized value means "no filter" rather than "not validated".
    pub fn from_filter(raw: &str) -> Option<Self> {
        match raw.trim() {
            "validated" => Some(Self::Validated),
            "not-validated" => Some(Self::NotValidated),
            _ => None,
        }
    }
}

// Status strings arrive free-form from clients; anything that is not
// exactly "validated" counts as not validated.
impl<'de> Deserialize<'de> for ValidationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim() {
            "validated" => Self::Validated,
            _ => Self::NotValidated,
        })
    }
}

/// Named checklist item inside a competence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCompetence {
    pub name: String,
    #[serde(default)]
    pub status: ValidationStatus,
}

/// Majority-vote global status: a competence counts as validated when its
/// validated sub-competences are at least half of the checklist. Ties round
/// in favor of validated; an empty checklist is not validated.
pub fn global_status(sub_competences: &[SubCompetence]) -> ValidationStatus {
    if sub_competences.is_empty() {
        return ValidationStatus::NotValidated;
    }

    let validated = sub_competences
        .iter()
        .filter(|sub| sub.status.is_validated())
        .count();

    if validated * 2 >= sub_competences.len() {
        ValidationStatus::Validated
    } else {
        ValidationStatus::NotValidated
    }
}

/// Share of validated sub-competences as a rounded integer percentage.
/// An empty checklist reports zero progress.
pub fn progress_percent(sub_competences: &[SubCompetence]) -> u8 {
    if sub_competences.is_empty() {
        return 0;
    }

    let validated = sub_competences
        .iter()
        .filter(|sub| sub.status.is_validated())
        .count();

    ((validated as f64 / sub_competences.len() as f64) * 100.0).round() as u8
}

/// Client-submitted payload for creating a competence.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetenceDraft {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sub_competences: Vec<SubCompetence>,
}

const CODE_MAX_CHARS: usize = 10;
const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 200;
const SUB_NAME_MIN_CHARS: usize = 2;
const SUB_NAME_MAX_CHARS: usize = 200;

/// Field-level rejection reasons surfaced to API callers as 400 responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("competence code is required")]
    MissingCode,
    #[error("competence code must be 1 to 10 uppercase letters or digits, got '{code}'")]
    InvalidCode { code: String },
    #[error("competence name is required")]
    MissingName,
    #[error("competence name must be between 3 and 200 characters")]
    NameLength,
    #[error("sub-competence name must be between 2 and 200 characters, got '{name}'")]
    SubCompetenceNameLength { name: String },
}

/// Trim and uppercase a submitted code, enforcing the catalog code format.
pub fn normalize_code(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingCode);
    }

    let code = trimmed.to_ascii_uppercase();
    let well_formed = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !well_formed || code.chars().count() > CODE_MAX_CHARS {
        return Err(ValidationError::InvalidCode { code });
    }

    Ok(code)
}

/// Trim a submitted competence name and enforce its length bounds.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }

    let chars = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::NameLength);
    }

    Ok(name.to_string())
}

/// Normalize a submitted checklist: names are trimmed, entries with empty
/// names are dropped, and every surviving name must fit the length bounds.
pub fn clean_sub_competences(
    sub_competences: Vec<SubCompetence>,
) -> Result<Vec<SubCompetence>, ValidationError> {
    let mut cleaned = Vec::with_capacity(sub_competences.len());
    for sub in sub_competences {
        let name = sub.name.trim();
        if name.is_empty() {
            continue;
        }

        let chars = name.chars().count();
        if !(SUB_NAME_MIN_CHARS..=SUB_NAME_MAX_CHARS).contains(&chars) {
            return Err(ValidationError::SubCompetenceNameLength {
                name: name.to_string(),
            });
        }

        cleaned.push(SubCompetence {
            name: name.to_string(),
            status: sub.status,
        });
    }

    Ok(cleaned)
}
