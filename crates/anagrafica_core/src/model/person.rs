//! Person record and its creation/replacement draft.
//!
//! # Responsibility
//! - Define the canonical person shape returned by registry queries.
//! - Validate caller drafts before the store commits anything.
//!
//! # Invariants
//! - `id`, `created_at` and `updated_at` are stamped by the store only.
//! - `documents` and `relationships` are owned; they die with the person.
//! - At most one primary address/contact per type.

use super::address::{validate_addresses, Address};
use super::contact::{validate_contacts, Contact};
use super::document::{Document, DocumentDraft};
use super::relationship::{Relationship, RelationshipDraft};
use super::{default_true, require_min_chars, PersonId, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shortest accepted first or last name.
pub const MIN_NAME_CHARS: usize = 2;

static FISCAL_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{6}[0-9]{2}[A-Z][0-9]{2}[A-Z][0-9]{3}[A-Z]$")
        .expect("valid fiscal code regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    Other,
}

/// Person as stored and returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Upper-cased national fiscal code.
    pub fiscal_code: Option<String>,
    pub gender: Option<Gender>,
    pub profession: Option<String>,
    pub notes: Option<String>,
    pub addresses: Vec<Address>,
    pub contacts: Vec<Contact>,
    pub documents: Vec<Document>,
    /// Outbound edges only.
    pub relationships: Vec<Relationship>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// `first_name + " " + last_name`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns an editable draft that keeps sub-entity ids stable on update.
    pub fn to_draft(&self) -> PersonDraft {
        PersonDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            fiscal_code: self.fiscal_code.clone(),
            gender: self.gender,
            profession: self.profession.clone(),
            notes: self.notes.clone(),
            addresses: self.addresses.clone(),
            contacts: self.contacts.clone(),
            documents: self.documents.iter().map(Document::to_draft).collect(),
            relationships: self
                .relationships
                .iter()
                .map(Relationship::to_draft)
                .collect(),
            is_active: self.is_active,
        }
    }

    pub fn document(&self, id: u64) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn relationship(&self, id: u64) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.id == id)
    }
}

/// Caller-supplied person fields for `create` and whole-record `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDraft {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub fiscal_code: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub documents: Vec<DocumentDraft>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDraft>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl PersonDraft {
    /// Creates a minimal active draft with no sub-entities.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            fiscal_code: None,
            gender: None,
            profession: None,
            notes: None,
            addresses: Vec::new(),
            contacts: Vec::new(),
            documents: Vec::new(),
            relationships: Vec::new(),
            is_active: true,
        }
    }

    pub fn born_on(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.push(contact);
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    pub fn with_document(mut self, document: DocumentDraft) -> Self {
        self.documents.push(document);
        self
    }

    /// Validates all draft-local rules.
    ///
    /// Reference checks (relationship targets, sub-entity ownership) need
    /// registry state and are done by the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars(&self.first_name, MIN_NAME_CHARS, "person", "first_name")?;
        require_min_chars(&self.last_name, MIN_NAME_CHARS, "person", "last_name")?;
        if let Some(raw) = self.fiscal_code.as_deref() {
            normalize_fiscal_code(raw)?;
        }
        validate_addresses(&self.addresses)?;
        validate_contacts(&self.contacts)?;

        let mut document_ids = HashSet::new();
        for document in &self.documents {
            document.validate()?;
            if let Some(id) = document.id {
                if !document_ids.insert(id) {
                    return Err(ValidationError::DuplicateId {
                        entity: "document",
                        id,
                    });
                }
            }
        }

        let mut relationship_ids = HashSet::new();
        for relationship in &self.relationships {
            if let Some(id) = relationship.id {
                if !relationship_ids.insert(id) {
                    return Err(ValidationError::DuplicateId {
                        entity: "relationship",
                        id,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Trims and upper-cases a fiscal code, then checks its format.
///
/// A blank value normalizes to `None`.
pub fn normalize_fiscal_code(raw: &str) -> Result<Option<String>, ValidationError> {
    let normalized = raw.trim().to_uppercase();
    if normalized.is_empty() {
        return Ok(None);
    }
    if !FISCAL_CODE_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidFiscalCode(raw.to_string()));
    }
    Ok(Some(normalized))
}
