//! Registry domain model.
//!
//! # Responsibility
//! - Define the person record and its owned sub-entities.
//! - Define caller-supplied drafts and their write-time validation.
//!
//! # Invariants
//! - Ids are assigned by the registry store only; drafts never carry a
//!   person id.
//! - Sub-entities exist only inside their owning `Person`.
//! - Closed enumerations expose total display labels.

pub mod address;
pub mod contact;
pub mod document;
pub mod person;
pub mod relationship;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of a person, issued by a monotonic counter and never reused.
pub type PersonId = u64;
/// Registry-wide identifier of a document.
pub type DocumentId = u64;
/// Registry-wide identifier of a relationship.
pub type RelationshipId = u64;

/// Write-time validation failure for a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is missing or blank.
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    /// A text field is shorter than `min` characters once trimmed.
    TooShort {
        entity: &'static str,
        field: &'static str,
        min: usize,
    },
    /// Fiscal code does not match the 16-character national format.
    InvalidFiscalCode(String),
    /// More than one entry of the same type is flagged primary.
    DuplicatePrimary {
        entity: &'static str,
        kind: &'static str,
    },
    /// The same sub-entity id appears twice in one draft.
    DuplicateId { entity: &'static str, id: u64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { entity, field } => {
                write!(f, "{entity}.{field} is required")
            }
            Self::TooShort { entity, field, min } => {
                write!(f, "{entity}.{field} must have at least {min} characters")
            }
            Self::InvalidFiscalCode(value) => write!(f, "invalid fiscal code `{value}`"),
            Self::DuplicatePrimary { entity, kind } => {
                write!(f, "more than one primary {entity} of type `{kind}`")
            }
            Self::DuplicateId { entity, id } => {
                write!(f, "{entity} id {id} appears more than once")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    value: &str,
    entity: &'static str,
    field: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { entity, field });
    }
    Ok(())
}

/// Like `require_text`, plus a minimum length counted in chars.
pub(crate) fn require_min_chars(
    value: &str,
    min: usize,
    entity: &'static str,
    field: &'static str,
) -> Result<(), ValidationError> {
    require_text(value, entity, field)?;
    if value.trim().chars().count() < min {
        return Err(ValidationError::TooShort { entity, field, min });
    }
    Ok(())
}

/// Rejects a second primary flag for the same `kind`.
pub(crate) fn require_single_primary<K>(
    entries: impl IntoIterator<Item = (K, bool)>,
    entity: &'static str,
    kind_name: impl Fn(&K) -> &'static str,
) -> Result<(), ValidationError>
where
    K: PartialEq,
{
    let mut seen: Vec<K> = Vec::new();
    for (kind, is_primary) in entries {
        if !is_primary {
            continue;
        }
        if seen.contains(&kind) {
            return Err(ValidationError::DuplicatePrimary {
                entity,
                kind: kind_name(&kind),
            });
        }
        seen.push(kind);
    }
    Ok(())
}

pub(crate) fn default_true() -> bool {
    true
}
