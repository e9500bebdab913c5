//! Document metadata owned by a person.
//!
//! # Invariants
//! - `id` is unique across the whole registry, not only within its owner.
//! - `person_id` always equals the owning person's id.
//! - The referenced blob (`file_path`) is managed outside the registry.

use super::{default_true, require_text, DocumentId, PersonId, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    IdentityCard,
    Passport,
    DrivingLicense,
    FiscalCode,
    Contract,
    Certificate,
    Invoice,
    Receipt,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 9] = [
        Self::IdentityCard,
        Self::Passport,
        Self::DrivingLicense,
        Self::FiscalCode,
        Self::Contract,
        Self::Certificate,
        Self::Invoice,
        Self::Receipt,
        Self::Other,
    ];

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdentityCard => "identity_card",
            Self::Passport => "passport",
            Self::DrivingLicense => "driving_license",
            Self::FiscalCode => "fiscal_code",
            Self::Contract => "contract",
            Self::Certificate => "certificate",
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::IdentityCard => "Identity card",
            Self::Passport => "Passport",
            Self::DrivingLicense => "Driving license",
            Self::FiscalCode => "Fiscal code",
            Self::Contract => "Contract",
            Self::Certificate => "Certificate",
            Self::Invoice => "Invoice",
            Self::Receipt => "Receipt",
            Self::Other => "Other",
        }
    }
}

/// Stored document record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// Back-reference to the owning person.
    pub person_id: PersonId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub upload_date: DateTime<Utc>,
    /// Calendar day the document stops being valid (start of day, UTC).
    pub expiry_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Converts the stored record back into an editable draft that keeps its id.
    pub fn to_draft(&self) -> DocumentDraft {
        DocumentDraft {
            id: Some(self.id),
            name: self.name.clone(),
            kind: self.kind,
            file_name: self.file_name.clone(),
            file_path: self.file_path.clone(),
            file_size: self.file_size,
            mime_type: self.mime_type.clone(),
            upload_date: Some(self.upload_date),
            expiry_date: self.expiry_date,
            description: self.description.clone(),
            is_active: self.is_active,
        }
    }
}

/// Caller-supplied document fields.
///
/// `id = None` asks the store for a fresh id; `Some(id)` refers to a document
/// already owned by the same person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDraft {
    #[serde(default)]
    pub id: Option<DocumentId>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Defaults to the commit time when absent.
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl DocumentDraft {
    pub fn new(name: impl Into<String>, kind: DocumentType) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            file_name: None,
            file_path: None,
            file_size: None,
            mime_type: None,
            upload_date: None,
            expiry_date: None,
            description: None,
            is_active: true,
        }
    }

    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn with_upload_date(mut self, upload_date: DateTime<Utc>) -> Self {
        self.upload_date = Some(upload_date);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "document", "name")
    }
}
