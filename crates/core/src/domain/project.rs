use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;

/// Identifier of a pricing project, safe to use as a storage key.
///
/// Construction goes through [`ProjectId::parse`], which rejects empty
/// identifiers and anything that could escape the project store
/// (path separators, a bare `..`, NUL bytes). The raw value is
/// otherwise kept exactly as supplied.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::InvalidProjectId {
                project_id: raw.to_string(),
                reason: "project identifier must not be empty",
            });
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(DomainError::InvalidProjectId {
                project_id: raw.to_string(),
                reason: "project identifier must not contain path separators",
            });
        }
        if raw == ".." {
            return Err(DomainError::InvalidProjectId {
                project_id: raw.to_string(),
                reason: "project identifier must not be `..`",
            });
        }
        if raw.contains('\0') {
            return Err(DomainError::InvalidProjectId {
                project_id: raw.to_string(),
                reason: "project identifier must not contain NUL bytes",
            });
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Externally authored pricing project. Never interpreted here, only handed
/// to the scoring engine as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectDefinition(pub Value);

impl ProjectDefinition {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
