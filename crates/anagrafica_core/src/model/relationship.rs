//! Directed person-to-person relationship.
//!
//! # Invariants
//! - Stored once, on the owner (`person_id`), as an outbound edge.
//! - `related_person_id != person_id`; checked by the store at write time.
//! - The inbound side is derived on read by the relationship index.

use super::{default_true, PersonId, RelationshipId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Client,
    Supplier,
    Partner,
    Employee,
    Employer,
    Colleague,
    Spouse,
    Parent,
    Child,
    Sibling,
    Relative,
    Friend,
    Contact,
    Other,
}

/// Grouping of relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipCategory {
    Commercial,
    Work,
    Family,
    Other,
}

impl RelationshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Supplier => "supplier",
            Self::Partner => "partner",
            Self::Employee => "employee",
            Self::Employer => "employer",
            Self::Colleague => "colleague",
            Self::Spouse => "spouse",
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Sibling => "sibling",
            Self::Relative => "relative",
            Self::Friend => "friend",
            Self::Contact => "contact",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Supplier => "Supplier",
            Self::Partner => "Partner",
            Self::Employee => "Employee",
            Self::Employer => "Employer",
            Self::Colleague => "Colleague",
            Self::Spouse => "Spouse",
            Self::Parent => "Parent",
            Self::Child => "Child",
            Self::Sibling => "Sibling",
            Self::Relative => "Relative",
            Self::Friend => "Friend",
            Self::Contact => "Contact",
            Self::Other => "Other",
        }
    }

    pub fn category(self) -> RelationshipCategory {
        match self {
            Self::Client | Self::Supplier | Self::Partner => RelationshipCategory::Commercial,
            Self::Employee | Self::Employer | Self::Colleague => RelationshipCategory::Work,
            Self::Spouse | Self::Parent | Self::Child | Self::Sibling | Self::Relative => {
                RelationshipCategory::Family
            }
            Self::Friend | Self::Contact | Self::Other => RelationshipCategory::Other,
        }
    }
}

impl RelationshipCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Commercial => "Commercial",
            Self::Work => "Work",
            Self::Family => "Family",
            Self::Other => "Other",
        }
    }
}

/// Stored outbound relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    /// Owner of the edge.
    pub person_id: PersonId,
    /// Target of the edge.
    pub related_person_id: PersonId,
    pub relationship_type: RelationshipType,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    pub fn to_draft(&self) -> RelationshipDraft {
        RelationshipDraft {
            id: Some(self.id),
            related_person_id: self.related_person_id,
            relationship_type: self.relationship_type,
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
        }
    }
}

/// Caller-supplied relationship fields; the owner is implied by context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDraft {
    #[serde(default)]
    pub id: Option<RelationshipId>,
    pub related_person_id: PersonId,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl RelationshipDraft {
    pub fn new(related_person_id: PersonId, relationship_type: RelationshipType) -> Self {
        Self {
            id: None,
            related_person_id,
            relationship_type,
            description: None,
            start_date: None,
            end_date: None,
            is_active: true,
        }
    }
}
