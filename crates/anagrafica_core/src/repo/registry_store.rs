//! In-memory registry store: the single mutable owner of registry state.
//!
//! # Responsibility
//! - Assign ids, stamp timestamps and apply person mutations atomically.
//! - Keep registry-wide indexes of document and relationship ownership.
//! - Publish a fresh snapshot to subscribers after every commit.
//!
//! # Invariants
//! - Person, document and relationship ids come from monotonic counters and
//!   are never reused, even after deletion.
//! - A mutation is fully built and checked before anything is committed;
//!   failures leave state and counters untouched.
//! - Reads and writes are serialized by one mutex; snapshots are immutable
//!   and shared, readers get copies.
//! - Persons are kept in id order, which is insertion order.
//! - The clock is read under the write lock, so timestamps follow commit
//!   order and `updated_at` never precedes `created_at`.

use super::clock::{Clock, SystemClock};
use super::notify::{DeliveryPolicy, SubscriberHub, Subscription, SubscriptionId};
use super::person_repo::{
    EntityRef, PersonRepository, ReferenceError, RegistryError, RegistryResult, Snapshot,
};
use crate::config::RegistryConfig;
use crate::model::document::{Document, DocumentDraft};
use crate::model::person::{normalize_fiscal_code, Person, PersonDraft};
use crate::model::relationship::{Relationship, RelationshipDraft};
use crate::model::{DocumentId, PersonId, RelationshipId};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy)]
struct IdCounters {
    next_person: PersonId,
    next_document: DocumentId,
    next_relationship: RelationshipId,
}

impl IdCounters {
    fn new() -> Self {
        Self {
            next_person: 1,
            next_document: 1,
            next_relationship: 1,
        }
    }

    fn person(&mut self) -> PersonId {
        let id = self.next_person;
        self.next_person += 1;
        id
    }

    fn document(&mut self) -> DocumentId {
        let id = self.next_document;
        self.next_document += 1;
        id
    }

    fn relationship(&mut self) -> RelationshipId {
        let id = self.next_relationship;
        self.next_relationship += 1;
        id
    }
}

/// Which person a sub-entity mutation applies to.
#[derive(Debug, Clone, Copy)]
enum Owner {
    Person(PersonId),
    OfDocument(DocumentId),
    OfRelationship(RelationshipId),
}

struct StoreState {
    ids: IdCounters,
    rows: BTreeMap<PersonId, Arc<Person>>,
    document_owner: HashMap<DocumentId, PersonId>,
    relationship_owner: HashMap<RelationshipId, PersonId>,
    snapshot: Snapshot,
    hub: SubscriberHub,
}

impl StoreState {
    fn new(policy: DeliveryPolicy) -> Self {
        Self {
            ids: IdCounters::new(),
            rows: BTreeMap::new(),
            document_owner: HashMap::new(),
            relationship_owner: HashMap::new(),
            snapshot: Snapshot::empty_at(0),
            hub: SubscriberHub::new(policy),
        }
    }

    fn resolve(&self, owner: Owner) -> RegistryResult<PersonId> {
        match owner {
            Owner::Person(id) if self.rows.contains_key(&id) => Ok(id),
            Owner::Person(id) => Err(RegistryError::NotFound(EntityRef::Person(id))),
            Owner::OfDocument(id) => self
                .document_owner
                .get(&id)
                .copied()
                .ok_or(RegistryError::NotFound(EntityRef::Document(id))),
            Owner::OfRelationship(id) => self
                .relationship_owner
                .get(&id)
                .copied()
                .ok_or(RegistryError::NotFound(EntityRef::Relationship(id))),
        }
    }

    fn check_reference(
        &self,
        person_id: PersonId,
        related_person_id: PersonId,
    ) -> Result<(), ReferenceError> {
        if related_person_id == person_id {
            return Err(ReferenceError::SelfReference { person_id });
        }
        if !self.rows.contains_key(&related_person_id) {
            return Err(ReferenceError::UnknownPerson {
                person_id,
                related_person_id,
            });
        }
        Ok(())
    }

    /// Inserts or replaces one row and re-indexes its sub-entities.
    fn put(&mut self, person: Person) {
        if let Some(previous) = self.rows.get(&person.id) {
            for document in &previous.documents {
                self.document_owner.remove(&document.id);
            }
            for relationship in &previous.relationships {
                self.relationship_owner.remove(&relationship.id);
            }
        }
        for document in &person.documents {
            let prior = self.document_owner.insert(document.id, person.id);
            assert!(prior.is_none(), "document id {} owned twice", document.id);
        }
        for relationship in &person.relationships {
            let prior = self.relationship_owner.insert(relationship.id, person.id);
            assert!(
                prior.is_none(),
                "relationship id {} owned twice",
                relationship.id
            );
        }
        self.rows.insert(person.id, Arc::new(person));
    }

    fn take(&mut self, id: PersonId) -> Option<Arc<Person>> {
        let removed = self.rows.remove(&id)?;
        for document in &removed.documents {
            self.document_owner.remove(&document.id);
        }
        for relationship in &removed.relationships {
            self.relationship_owner.remove(&relationship.id);
        }
        Some(removed)
    }

    fn publish(&mut self) -> u64 {
        let version = self.snapshot.version() + 1;
        self.snapshot = Snapshot::new(version, self.rows.values().cloned().collect());
        self.hub.publish(&self.snapshot);
        version
    }

    /// Materializes `draft` as person `id`, allocating sub-entity ids from `ids`.
    fn build_person(
        &self,
        ids: &mut IdCounters,
        id: PersonId,
        draft: &PersonDraft,
        previous: Option<&Person>,
        now: DateTime<Utc>,
    ) -> RegistryResult<Person> {
        draft.validate()?;
        let fiscal_code = match draft.fiscal_code.as_deref() {
            Some(raw) => normalize_fiscal_code(raw)?,
            None => None,
        };

        let mut documents = Vec::with_capacity(draft.documents.len());
        for document_draft in &draft.documents {
            let existing = match document_draft.id {
                Some(document_id) => Some(
                    previous
                        .and_then(|person| person.document(document_id))
                        .ok_or(RegistryError::NotFound(EntityRef::Document(document_id)))?,
                ),
                None => None,
            };
            documents.push(match existing {
                Some(existing) if existing.to_draft() == *document_draft => existing.clone(),
                Some(existing) => materialize_document(
                    document_draft,
                    existing.id,
                    id,
                    Some(existing),
                    now,
                ),
                None => materialize_document(document_draft, ids.document(), id, None, now),
            });
        }

        let mut relationships = Vec::with_capacity(draft.relationships.len());
        for relationship_draft in &draft.relationships {
            self.check_reference(id, relationship_draft.related_person_id)?;
            let existing = match relationship_draft.id {
                Some(relationship_id) => Some(
                    previous
                        .and_then(|person| person.relationship(relationship_id))
                        .ok_or(RegistryError::NotFound(EntityRef::Relationship(
                            relationship_id,
                        )))?,
                ),
                None => None,
            };
            relationships.push(match existing {
                Some(existing) if existing.to_draft() == *relationship_draft => existing.clone(),
                Some(existing) => materialize_relationship(
                    relationship_draft,
                    existing.id,
                    id,
                    existing.created_at,
                    now,
                ),
                None => materialize_relationship(
                    relationship_draft,
                    ids.relationship(),
                    id,
                    now,
                    now,
                ),
            });
        }

        Ok(Person {
            id,
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            date_of_birth: draft.date_of_birth,
            fiscal_code,
            gender: draft.gender,
            profession: draft.profession.clone(),
            notes: draft.notes.clone(),
            addresses: draft.addresses.clone(),
            contacts: draft.contacts.clone(),
            documents,
            relationships,
            is_active: draft.is_active,
            created_at: previous.map_or(now, |person| person.created_at),
            updated_at: now,
        })
    }
}

fn materialize_document(
    draft: &DocumentDraft,
    id: DocumentId,
    person_id: PersonId,
    existing: Option<&Document>,
    now: DateTime<Utc>,
) -> Document {
    let upload_date = draft
        .upload_date
        .or_else(|| existing.map(|document| document.upload_date))
        .unwrap_or(now);
    Document {
        id,
        person_id,
        name: draft.name.trim().to_string(),
        kind: draft.kind,
        file_name: draft.file_name.clone(),
        file_path: draft.file_path.clone(),
        file_size: draft.file_size,
        mime_type: draft.mime_type.clone(),
        upload_date,
        expiry_date: draft.expiry_date,
        description: draft.description.clone(),
        is_active: draft.is_active,
        created_at: existing.map_or(now, |document| document.created_at),
        updated_at: now,
    }
}

fn materialize_relationship(
    draft: &RelationshipDraft,
    id: RelationshipId,
    person_id: PersonId,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Relationship {
    Relationship {
        id,
        person_id,
        related_person_id: draft.related_person_id,
        relationship_type: draft.relationship_type,
        description: draft.description.clone(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        is_active: draft.is_active,
        created_at,
        updated_at: now,
    }
}

fn rejected(event: &'static str, err: RegistryError) -> RegistryError {
    // Error text may echo draft values; log the code only.
    warn!(
        "event={} module=store status=error error_code={}",
        event,
        err.code()
    );
    err
}

/// Thread-safe in-memory registry.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct RegistryStore {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore {
    /// Empty store on the system clock with unbounded delivery.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::new(DeliveryPolicy::default())),
            clock: Arc::new(SystemClock),
        }
    }

    /// Empty store using the configured default delivery policy.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new().with_delivery_policy(config.delivery)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the default policy used by [`PersonRepository::subscribe`].
    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        state.hub = SubscriberHub::new(policy);
        self
    }

    pub fn default_delivery_policy(&self) -> DeliveryPolicy {
        self.lock().hub.default_policy()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().hub.len()
    }

    // Every mutation is computed before commit, so a poisoned lock still
    // guards consistent state.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuilds one person from an edited copy of its current draft.
    ///
    /// Returns the row before and after the edit.
    fn modify(
        &self,
        event: &'static str,
        owner: Owner,
        edit: impl FnOnce(&mut PersonDraft),
    ) -> RegistryResult<(Arc<Person>, Person)> {
        let mut state = self.lock();
        let now = self.clock.now();
        let person_id = state.resolve(owner).map_err(|err| rejected(event, err))?;
        let previous = state
            .rows
            .get(&person_id)
            .cloned()
            .ok_or_else(|| rejected(event, RegistryError::NotFound(EntityRef::Person(person_id))))?;

        let mut draft = previous.to_draft();
        edit(&mut draft);

        let mut ids = state.ids;
        let person = state
            .build_person(&mut ids, person_id, &draft, Some(&previous), now)
            .map_err(|err| rejected(event, err))?;
        state.ids = ids;
        state.put(person.clone());
        let version = state.publish();
        info!(
            "event={} module=store status=ok person_id={} version={}",
            event, person_id, version
        );
        Ok((previous, person))
    }
}

impl PersonRepository for RegistryStore {
    fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    fn get(&self, id: PersonId) -> RegistryResult<Person> {
        self.lock()
            .rows
            .get(&id)
            .map(|person| person.as_ref().clone())
            .ok_or(RegistryError::NotFound(EntityRef::Person(id)))
    }

    fn create(&self, draft: &PersonDraft) -> RegistryResult<Person> {
        let mut state = self.lock();
        let now = self.clock.now();
        let mut ids = state.ids;
        let id = ids.person();
        assert!(!state.rows.contains_key(&id), "person id {id} issued twice");

        let person = state
            .build_person(&mut ids, id, draft, None, now)
            .map_err(|err| rejected("person_create", err))?;
        state.ids = ids;
        state.put(person.clone());
        let version = state.publish();
        info!(
            "event=person_create module=store status=ok person_id={} documents={} relationships={} version={}",
            id,
            person.documents.len(),
            person.relationships.len(),
            version
        );
        Ok(person)
    }

    fn update(&self, id: PersonId, draft: &PersonDraft) -> RegistryResult<Person> {
        let mut state = self.lock();
        let now = self.clock.now();
        let previous = state
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                rejected(
                    "person_update",
                    RegistryError::NotFound(EntityRef::Person(id)),
                )
            })?;

        let mut ids = state.ids;
        let person = state
            .build_person(&mut ids, id, draft, Some(&previous), now)
            .map_err(|err| rejected("person_update", err))?;
        state.ids = ids;
        state.put(person.clone());
        let version = state.publish();
        info!(
            "event=person_update module=store status=ok person_id={} documents={} relationships={} version={}",
            id,
            person.documents.len(),
            person.relationships.len(),
            version
        );
        Ok(person)
    }

    fn delete(&self, id: PersonId) -> bool {
        let mut state = self.lock();
        let now = self.clock.now();
        let Some(removed) = state.take(id) else {
            debug!(
                "event=person_delete module=store status=ok person_id={} removed=false",
                id
            );
            return false;
        };

        // Edges owned by other persons must not point at a deleted person.
        let referrers: Vec<Arc<Person>> = state
            .rows
            .values()
            .filter(|person| {
                person
                    .relationships
                    .iter()
                    .any(|rel| rel.related_person_id == id)
            })
            .cloned()
            .collect();
        let mut pruned_edges = 0;
        for referrer in referrers {
            let mut person = referrer.as_ref().clone();
            let before = person.relationships.len();
            person
                .relationships
                .retain(|rel| rel.related_person_id != id);
            pruned_edges += before - person.relationships.len();
            person.updated_at = now;
            state.put(person);
        }

        let version = state.publish();
        info!(
            "event=person_delete module=store status=ok person_id={} removed=true documents={} relationships={} inbound_pruned={} version={}",
            id,
            removed.documents.len(),
            removed.relationships.len(),
            pruned_edges,
            version
        );
        true
    }

    fn get_document(&self, id: DocumentId) -> RegistryResult<Document> {
        let state = self.lock();
        state
            .document_owner
            .get(&id)
            .and_then(|owner| state.rows.get(owner))
            .and_then(|person| person.document(id))
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Document(id)))
    }

    fn add_document(&self, person_id: PersonId, draft: &DocumentDraft) -> RegistryResult<Document> {
        let mut fresh = draft.clone();
        fresh.id = None;
        let (_, person) = self.modify("document_add", Owner::Person(person_id), |edited| {
            edited.documents.push(fresh);
        })?;
        person
            .documents
            .last()
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Person(person_id)))
    }

    fn update_document(&self, id: DocumentId, draft: &DocumentDraft) -> RegistryResult<Document> {
        let mut replacement = draft.clone();
        replacement.id = Some(id);
        let (_, person) = self.modify("document_update", Owner::OfDocument(id), |edited| {
            if let Some(slot) = edited.documents.iter_mut().find(|doc| doc.id == Some(id)) {
                *slot = replacement;
            }
        })?;
        person
            .document(id)
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Document(id)))
    }

    fn remove_document(&self, id: DocumentId) -> RegistryResult<Document> {
        let (previous, _) = self.modify("document_remove", Owner::OfDocument(id), |edited| {
            edited.documents.retain(|doc| doc.id != Some(id));
        })?;
        previous
            .document(id)
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Document(id)))
    }

    fn get_relationship(&self, id: RelationshipId) -> RegistryResult<Relationship> {
        let state = self.lock();
        state
            .relationship_owner
            .get(&id)
            .and_then(|owner| state.rows.get(owner))
            .and_then(|person| person.relationship(id))
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Relationship(id)))
    }

    fn add_relationship(
        &self,
        person_id: PersonId,
        draft: &RelationshipDraft,
    ) -> RegistryResult<Relationship> {
        let mut fresh = draft.clone();
        fresh.id = None;
        let (_, person) = self.modify("relationship_add", Owner::Person(person_id), |edited| {
            edited.relationships.push(fresh);
        })?;
        person
            .relationships
            .last()
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Person(person_id)))
    }

    fn update_relationship(
        &self,
        id: RelationshipId,
        draft: &RelationshipDraft,
    ) -> RegistryResult<Relationship> {
        let mut replacement = draft.clone();
        replacement.id = Some(id);
        let (_, person) =
            self.modify("relationship_update", Owner::OfRelationship(id), |edited| {
                if let Some(slot) = edited
                    .relationships
                    .iter_mut()
                    .find(|rel| rel.id == Some(id))
                {
                    *slot = replacement;
                }
            })?;
        person
            .relationship(id)
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Relationship(id)))
    }

    fn set_relationship_active(
        &self,
        id: RelationshipId,
        is_active: bool,
    ) -> RegistryResult<Relationship> {
        let (_, person) =
            self.modify("relationship_update", Owner::OfRelationship(id), |edited| {
                if let Some(slot) = edited
                    .relationships
                    .iter_mut()
                    .find(|rel| rel.id == Some(id))
                {
                    slot.is_active = is_active;
                }
            })?;
        person
            .relationship(id)
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Relationship(id)))
    }

    fn remove_relationship(&self, id: RelationshipId) -> RegistryResult<Relationship> {
        let (previous, _) =
            self.modify("relationship_remove", Owner::OfRelationship(id), |edited| {
                edited.relationships.retain(|rel| rel.id != Some(id));
            })?;
        previous
            .relationship(id)
            .cloned()
            .ok_or(RegistryError::NotFound(EntityRef::Relationship(id)))
    }

    fn subscribe(&self) -> Subscription {
        let mut state = self.lock();
        let policy = state.hub.default_policy();
        state.hub.subscribe(policy)
    }

    fn subscribe_with(&self, policy: DeliveryPolicy) -> Subscription {
        self.lock().hub.subscribe(policy)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().hub.unsubscribe(id)
    }
}
