//! Direction-tagged relationship lookup.
//!
//! # Invariants
//! - Relationships are stored once, by their owner. The inbound side is a
//!   read-time view of the same row, never a second record.
//! - Per person: outbound relationships in the owner's order, then inbound
//!   ones in registry order.

use crate::model::person::Person;
use crate::model::relationship::Relationship;
use crate::model::PersonId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The queried person owns the relationship.
    Outbound,
    /// The queried person is the relationship's target.
    Inbound,
}

/// A relationship seen from one of its two endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedRelationship {
    pub relationship: Relationship,
    pub direction: Direction,
    /// The other endpoint.
    pub counterpart_id: PersonId,
    /// `None` when the counterpart is not part of the indexed persons.
    pub counterpart_name: Option<String>,
}

/// Relationship lookup built once from a snapshot and queried many times.
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    by_person: HashMap<PersonId, Vec<DirectedRelationship>>,
}

impl RelationshipIndex {
    pub fn build<'a, I>(persons: I) -> Self
    where
        I: IntoIterator<Item = &'a Person>,
    {
        let persons: Vec<&Person> = persons.into_iter().collect();
        let names: HashMap<PersonId, String> = persons
            .iter()
            .map(|person| (person.id, person.full_name()))
            .collect();

        let mut by_person: HashMap<PersonId, Vec<DirectedRelationship>> = HashMap::new();
        for person in &persons {
            for relationship in &person.relationships {
                by_person
                    .entry(person.id)
                    .or_default()
                    .push(directed(relationship, Direction::Outbound, &names));
            }
        }
        for person in &persons {
            for relationship in &person.relationships {
                by_person
                    .entry(relationship.related_person_id)
                    .or_default()
                    .push(directed(relationship, Direction::Inbound, &names));
            }
        }
        Self { by_person }
    }

    pub fn relationships_of(&self, person_id: PersonId) -> &[DirectedRelationship] {
        self.by_person
            .get(&person_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of relationships touching `person_id`, in either direction.
    pub fn degree(&self, person_id: PersonId) -> usize {
        self.relationships_of(person_id).len()
    }
}

/// One-off lookup without building a full index.
pub fn relationships_of<'a, I>(persons: I, person_id: PersonId) -> Vec<DirectedRelationship>
where
    I: IntoIterator<Item = &'a Person>,
{
    let persons: Vec<&Person> = persons.into_iter().collect();
    let names: HashMap<PersonId, String> = persons
        .iter()
        .map(|person| (person.id, person.full_name()))
        .collect();

    let mut result: Vec<DirectedRelationship> = persons
        .iter()
        .filter(|person| person.id == person_id)
        .flat_map(|person| person.relationships.iter())
        .map(|relationship| directed(relationship, Direction::Outbound, &names))
        .collect();
    result.extend(
        persons
            .iter()
            .flat_map(|person| person.relationships.iter())
            .filter(|relationship| relationship.related_person_id == person_id)
            .map(|relationship| directed(relationship, Direction::Inbound, &names)),
    );
    result
}

fn directed(
    relationship: &Relationship,
    direction: Direction,
    names: &HashMap<PersonId, String>,
) -> DirectedRelationship {
    let counterpart_id = match direction {
        Direction::Outbound => relationship.related_person_id,
        Direction::Inbound => relationship.person_id,
    };
    DirectedRelationship {
        relationship: relationship.clone(),
        direction,
        counterpart_id,
        counterpart_name: names.get(&counterpart_id).cloned(),
    }
}
