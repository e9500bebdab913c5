//! Contact channel (phone, email, ...) embedded in a person record.

use super::{require_single_primary, require_text, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    Phone,
    Email,
    Fax,
    Mobile,
    Other,
}

impl ContactType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Fax => "fax",
            Self::Mobile => "mobile",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Fax => "Fax",
            Self::Mobile => "Mobile",
            Self::Other => "Other",
        }
    }
}

/// Contact entry owned by a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub kind: ContactType,
    pub value: String,
    /// Free-text label; display only, never searched.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl Contact {
    pub fn new(kind: ContactType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            label: None,
            is_primary: false,
        }
    }

    /// Builder-style helper for the primary entry of its type.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.value, "contact", "value")
    }
}

/// Validates every contact and the one-primary-per-type rule.
pub fn validate_contacts(contacts: &[Contact]) -> Result<(), ValidationError> {
    for contact in contacts {
        contact.validate()?;
    }
    require_single_primary(
        contacts.iter().map(|c| (c.kind, c.is_primary)),
        "contact",
        |kind| kind.as_str(),
    )
}
