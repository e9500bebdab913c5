//! Free-text person filter and list-row summaries.
//!
//! # Invariants
//! - Blank terms return the input unchanged.
//! - Matching is a case-insensitive substring test on the full name and on
//!   every contact value. Contact labels are never matched.
//! - Matches keep their input order.

use crate::model::contact::{Contact, ContactType};
use crate::model::person::Person;
use crate::model::PersonId;
use serde::{Deserialize, Serialize};

/// Persons matching `term`, in input order.
pub fn filter_persons<'a, I>(persons: I, term: &str) -> Vec<&'a Person>
where
    I: IntoIterator<Item = &'a Person>,
{
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return persons.into_iter().collect();
    }
    persons
        .into_iter()
        .filter(|person| matches_term(person, &needle))
        .collect()
}

/// `needle` must already be trimmed and lower-cased.
fn matches_term(person: &Person, needle: &str) -> bool {
    if person.full_name().to_lowercase().contains(needle) {
        return true;
    }
    person
        .contacts
        .iter()
        .any(|contact| contact.value.to_lowercase().contains(needle))
}

/// Row shown by the person list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub primary_email: Option<String>,
    pub primary_phone: Option<String>,
}

pub fn summarize(person: &Person) -> PersonSummary {
    PersonSummary {
        id: person.id,
        first_name: person.first_name.clone(),
        last_name: person.last_name.clone(),
        primary_email: preferred_contact(&person.contacts, ContactType::Email),
        primary_phone: preferred_contact(&person.contacts, ContactType::Phone),
    }
}

/// Primary contact of `kind`, else the first one of that kind.
fn preferred_contact(contacts: &[Contact], kind: ContactType) -> Option<String> {
    contacts
        .iter()
        .find(|contact| contact.kind == kind && contact.is_primary)
        .or_else(|| contacts.iter().find(|contact| contact.kind == kind))
        .map(|contact| contact.value.clone())
}
