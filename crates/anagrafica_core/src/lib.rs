//! Core domain logic for the personal registry.
//! This crate is the single source of truth for registry invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod view;

pub use config::{ConfigError, RegistryConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::address::{Address, AddressType};
pub use model::contact::{Contact, ContactType};
pub use model::document::{Document, DocumentDraft, DocumentType};
pub use model::person::{Gender, Person, PersonDraft};
pub use model::relationship::{
    Relationship, RelationshipCategory, RelationshipDraft, RelationshipType,
};
pub use model::{DocumentId, PersonId, RelationshipId, ValidationError};
pub use repo::clock::{Clock, ManualClock, SystemClock};
pub use repo::notify::{DeliveryPolicy, Subscription, SubscriptionId};
pub use repo::person_repo::{
    EntityRef, PersonRepository, ReferenceError, RegistryError, RegistryResult, Snapshot,
};
pub use repo::registry_store::RegistryStore;
pub use search::filter::{filter_persons, summarize, PersonSummary};
pub use service::registry_service::{RegistryService, ReminderDashboard};
pub use view::expiry::{classify, DocumentStatus, ExpiryClass, ExpiryTier};
pub use view::relationship_index::{DirectedRelationship, Direction, RelationshipIndex};
pub use view::reminder::{has_critical, reminders, ReminderItem, ReminderQuery};
pub use view::statistics::{aggregate, AgeBracket, Statistics};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
