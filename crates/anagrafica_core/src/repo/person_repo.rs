//! Registry repository contract, snapshot type and error model.
//!
//! # Responsibility
//! - Define the CRUD/query/subscription API consumed by services and the
//!   presentation layer.
//! - Define the immutable `Snapshot` handed to readers and subscribers.
//!
//! # Invariants
//! - `NotFound`, `InvalidReference` and `Validation` are typed outcomes;
//!   none of them is process-fatal.
//! - A failed mutation leaves the registry untouched.

use super::notify::{DeliveryPolicy, Subscription, SubscriptionId};
use crate::model::document::{Document, DocumentDraft};
use crate::model::person::{Person, PersonDraft};
use crate::model::relationship::{Relationship, RelationshipDraft};
use crate::model::{DocumentId, PersonId, RelationshipId, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Entity addressed by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Person(PersonId),
    Document(DocumentId),
    Relationship(RelationshipId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person(id) => write!(f, "person {id}"),
            Self::Document(id) => write!(f, "document {id}"),
            Self::Relationship(id) => write!(f, "relationship {id}"),
        }
    }
}

/// Broken person-to-person reference in a relationship draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceError {
    SelfReference {
        person_id: PersonId,
    },
    UnknownPerson {
        person_id: PersonId,
        related_person_id: PersonId,
    },
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfReference { person_id } => {
                write!(f, "person {person_id} cannot be related to itself")
            }
            Self::UnknownPerson {
                person_id,
                related_person_id,
            } => write!(
                f,
                "person {person_id} references unknown person {related_person_id}"
            ),
        }
    }
}

/// Registry operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotFound(EntityRef),
    InvalidReference(ReferenceError),
    Validation(ValidationError),
}

impl RegistryError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidReference(_) => "invalid_reference",
            Self::Validation(_) => "validation",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::InvalidReference(err) => write!(f, "invalid reference: {err}"),
            Self::Validation(err) => write!(f, "validation failed: {err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::InvalidReference(_) => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReferenceError> for RegistryError {
    fn from(value: ReferenceError) -> Self {
        Self::InvalidReference(value)
    }
}

/// Immutable point-in-time view of every person, in insertion order.
///
/// Cloning is cheap: persons are shared, never copied, until `to_vec`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    persons: Arc<[Arc<Person>]>,
}

impl Snapshot {
    pub(crate) fn new(version: u64, persons: Vec<Arc<Person>>) -> Self {
        Self {
            version,
            persons: persons.into(),
        }
    }

    pub(crate) fn empty_at(version: u64) -> Self {
        Self::new(version, Vec::new())
    }

    /// Number of mutations committed before this snapshot was taken.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn iter(&self) -> SnapshotIter<'_> {
        SnapshotIter {
            inner: self.persons.iter(),
        }
    }

    /// Persons are ordered by id, so lookup is a binary search.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.persons
            .binary_search_by_key(&id, |person| person.id)
            .ok()
            .map(|index| self.persons[index].as_ref())
    }

    /// Deep copy the caller may mutate freely.
    pub fn to_vec(&self) -> Vec<Person> {
        self.iter().cloned().collect()
    }
}

/// Borrowing iterator over a snapshot's persons.
pub struct SnapshotIter<'a> {
    inner: std::slice::Iter<'a, Arc<Person>>,
}

impl<'a> Iterator for SnapshotIter<'a> {
    type Item = &'a Person;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|person| person.as_ref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Person;
    type IntoIter = SnapshotIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Repository interface for the person registry.
///
/// Every successful mutation publishes exactly one new snapshot.
pub trait PersonRepository {
    fn snapshot(&self) -> Snapshot;

    /// Copy-on-read list in insertion order.
    fn list(&self) -> Vec<Person> {
        self.snapshot().to_vec()
    }

    fn get(&self, id: PersonId) -> RegistryResult<Person>;
    fn create(&self, draft: &PersonDraft) -> RegistryResult<Person>;
    /// Whole-record replacement; `id` and `created_at` are preserved.
    fn update(&self, id: PersonId, draft: &PersonDraft) -> RegistryResult<Person>;
    /// Returns whether a person was actually removed.
    fn delete(&self, id: PersonId) -> bool;

    fn get_document(&self, id: DocumentId) -> RegistryResult<Document>;
    fn add_document(&self, person_id: PersonId, draft: &DocumentDraft) -> RegistryResult<Document>;
    fn update_document(&self, id: DocumentId, draft: &DocumentDraft) -> RegistryResult<Document>;
    fn remove_document(&self, id: DocumentId) -> RegistryResult<Document>;

    fn get_relationship(&self, id: RelationshipId) -> RegistryResult<Relationship>;
    fn add_relationship(
        &self,
        person_id: PersonId,
        draft: &RelationshipDraft,
    ) -> RegistryResult<Relationship>;
    fn update_relationship(
        &self,
        id: RelationshipId,
        draft: &RelationshipDraft,
    ) -> RegistryResult<Relationship>;
    fn set_relationship_active(
        &self,
        id: RelationshipId,
        is_active: bool,
    ) -> RegistryResult<Relationship>;
    fn remove_relationship(&self, id: RelationshipId) -> RegistryResult<Relationship>;

    /// Subscribes with the repository's default delivery policy.
    fn subscribe(&self) -> Subscription;
    fn subscribe_with(&self, policy: DeliveryPolicy) -> Subscription;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
