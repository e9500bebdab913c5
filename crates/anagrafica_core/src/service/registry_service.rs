//! Registry use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for presentation callers.
//! - Combine the current snapshot with derived views (search, expiry,
//!   reminders, relationships, statistics) using configured defaults.
//!
//! # Invariants
//! - Service APIs never bypass repository validation contracts.
//! - Each derived call reads exactly one snapshot.
//! - The service stays storage-agnostic.

use crate::config::RegistryConfig;
use crate::model::document::Document;
use crate::model::person::{Person, PersonDraft};
use crate::model::relationship::{Relationship, RelationshipDraft, RelationshipType};
use crate::model::PersonId;
use crate::repo::clock::{Clock, SystemClock};
use crate::repo::notify::Subscription;
use crate::repo::person_repo::{
    EntityRef, PersonRepository, RegistryError, RegistryResult, Snapshot,
};
use crate::search::filter::{filter_persons, summarize, PersonSummary};
use crate::view::expiry::{self, DocumentStatus};
use crate::view::relationship_index::{self, DirectedRelationship};
use crate::view::reminder::{self, ReminderItem, ReminderQuery};
use crate::view::statistics::{self, Statistics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reminder list plus the interrupt flag shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDashboard {
    pub items: Vec<ReminderItem>,
    pub has_critical: bool,
    pub critical_count: usize,
}

/// Use-case service wrapper around a registry repository.
pub struct RegistryService<R: PersonRepository> {
    repo: R,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
}

impl<R: PersonRepository> RegistryService<R> {
    /// Creates a service on the system clock.
    pub fn new(repo: R, config: RegistryConfig) -> Self {
        Self {
            repo,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used as `as_of` for derived views.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        self.repo.snapshot()
    }

    pub fn list(&self) -> Vec<Person> {
        self.repo.list()
    }

    pub fn get(&self, id: PersonId) -> RegistryResult<Person> {
        self.repo.get(id)
    }

    pub fn create(&self, draft: &PersonDraft) -> RegistryResult<Person> {
        self.repo.create(draft)
    }

    /// Whole-record replacement; errors are returned unchanged.
    pub fn update(&self, id: PersonId, draft: &PersonDraft) -> RegistryResult<Person> {
        self.repo.update(id, draft)
    }

    pub fn delete(&self, id: PersonId) -> bool {
        self.repo.delete(id)
    }

    /// Persons whose name or contact values contain `term`.
    pub fn search(&self, term: &str) -> Vec<Person> {
        let snapshot = self.repo.snapshot();
        filter_persons(&snapshot, term).into_iter().cloned().collect()
    }

    pub fn summaries(&self) -> Vec<PersonSummary> {
        self.repo.snapshot().iter().map(summarize).collect()
    }

    /// Documents of one person, most urgent expiry first.
    pub fn documents_of(&self, person_id: PersonId) -> RegistryResult<Vec<Document>> {
        let person = self.repo.get(person_id)?;
        let mut documents = person.documents;
        expiry::sort_by_expiry(&mut documents, self.clock.now());
        Ok(documents)
    }

    /// List-view status using the configured expiring window.
    pub fn document_status(&self, document: &Document) -> DocumentStatus {
        expiry::document_status(document, self.clock.now(), self.config.expiring_window_days)
    }

    /// Outbound then inbound relationships of `person_id`.
    ///
    /// # Errors
    /// - `NotFound` when the person does not exist.
    pub fn relationships_of(
        &self,
        person_id: PersonId,
    ) -> RegistryResult<Vec<DirectedRelationship>> {
        let snapshot = self.repo.snapshot();
        if snapshot.get(person_id).is_none() {
            return Err(RegistryError::NotFound(EntityRef::Person(person_id)));
        }
        Ok(relationship_index::relationships_of(&snapshot, person_id))
    }

    /// Adds an active relationship from `person_id` to `related_person_id`.
    pub fn link(
        &self,
        person_id: PersonId,
        related_person_id: PersonId,
        relationship_type: RelationshipType,
    ) -> RegistryResult<Relationship> {
        let draft = RelationshipDraft::new(related_person_id, relationship_type);
        self.repo.add_relationship(person_id, &draft)
    }

    /// Reminders over the configured horizon, as of now.
    pub fn reminders(&self) -> Vec<ReminderItem> {
        self.reminders_with(ReminderQuery::within(self.config.reminder_horizon_days))
    }

    pub fn reminders_with(&self, query: ReminderQuery) -> Vec<ReminderItem> {
        let snapshot = self.repo.snapshot();
        reminder::reminders_with(&snapshot, query, self.clock.now())
    }

    pub fn dashboard_reminders(&self) -> ReminderDashboard {
        let items = self.reminders();
        ReminderDashboard {
            has_critical: reminder::has_critical(&items),
            critical_count: reminder::critical_count(&items),
            items,
        }
    }

    /// Registry statistics with ages computed as of today.
    pub fn statistics(&self) -> Statistics {
        let snapshot = self.repo.snapshot();
        statistics::aggregate(&snapshot, self.clock.now().date_naive())
    }

    pub fn subscribe(&self) -> Subscription {
        self.repo.subscribe()
    }
}
