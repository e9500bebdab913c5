//! Registry-wide counters for the reports view.
//!
//! # Invariants
//! - Relationships are counted once, from their owner.
//! - All five age brackets are always present; persons without a date of
//!   birth fall in none of them.

use crate::model::document::DocumentType;
use crate::model::person::Person;
use crate::model::relationship::{RelationshipCategory, RelationshipType};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "0-18")]
    UpTo18,
    #[serde(rename = "19-35")]
    From19To35,
    #[serde(rename = "36-50")]
    From36To50,
    #[serde(rename = "51-65")]
    From51To65,
    #[serde(rename = "65+")]
    Over65,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        Self::UpTo18,
        Self::From19To35,
        Self::From36To50,
        Self::From51To65,
        Self::Over65,
    ];

    pub fn for_age(age: i32) -> Self {
        match age {
            i32::MIN..=18 => Self::UpTo18,
            19..=35 => Self::From19To35,
            36..=50 => Self::From36To50,
            51..=65 => Self::From51To65,
            _ => Self::Over65,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::UpTo18 => "0-18",
            Self::From19To35 => "19-35",
            Self::From36To50 => "36-50",
            Self::From51To65 => "51-65",
            Self::Over65 => "65+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_persons: usize,
    pub total_documents: usize,
    pub total_relationships: usize,
    pub documents_by_type: BTreeMap<DocumentType, usize>,
    pub relationships_by_type: BTreeMap<RelationshipType, usize>,
    pub relationships_by_category: BTreeMap<RelationshipCategory, usize>,
    pub age_brackets: BTreeMap<AgeBracket, usize>,
}

impl Statistics {
    /// Indented JSON, as offered by the reports export.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn bracket(&self, bracket: AgeBracket) -> usize {
        self.age_brackets.get(&bracket).copied().unwrap_or(0)
    }
}

/// Completed years between `date_of_birth` and `as_of`.
///
/// Negative when the birth date lies after `as_of`.
pub fn age_on(date_of_birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut age = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

pub fn aggregate<'a, I>(persons: I, as_of: NaiveDate) -> Statistics
where
    I: IntoIterator<Item = &'a Person>,
{
    let mut stats = Statistics {
        total_persons: 0,
        total_documents: 0,
        total_relationships: 0,
        documents_by_type: BTreeMap::new(),
        relationships_by_type: BTreeMap::new(),
        relationships_by_category: BTreeMap::new(),
        age_brackets: AgeBracket::ALL.iter().map(|bracket| (*bracket, 0)).collect(),
    };

    for person in persons {
        stats.total_persons += 1;

        stats.total_documents += person.documents.len();
        for document in &person.documents {
            *stats.documents_by_type.entry(document.kind).or_default() += 1;
        }

        stats.total_relationships += person.relationships.len();
        for relationship in &person.relationships {
            let kind = relationship.relationship_type;
            *stats.relationships_by_type.entry(kind).or_default() += 1;
            *stats
                .relationships_by_category
                .entry(kind.category())
                .or_default() += 1;
        }

        if let Some(date_of_birth) = person.date_of_birth {
            let bracket = AgeBracket::for_age(age_on(date_of_birth, as_of));
            *stats.age_brackets.entry(bracket).or_default() += 1;
        }
    }
    stats
}
