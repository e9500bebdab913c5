use anagrafica_core::{
    DocumentDraft, DocumentType, EntityRef, ManualClock, PersonDraft, PersonRepository,
    ReferenceError, RegistryError, RegistryStore, RelationshipDraft, RelationshipType,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

fn fixture() -> (RegistryStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap(),
    ));
    let store = RegistryStore::new().with_clock(clock.clone());
    (store, clock)
}

fn passport() -> DocumentDraft {
    DocumentDraft::new("Passaporto", DocumentType::Passport)
        .with_expiry(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
}

#[test]
fn add_document_sets_owner_and_fresh_id() {
    let (store, clock) = fixture();
    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();

    clock.advance(Duration::minutes(5));
    let document = store.add_document(person.id, &passport()).unwrap();

    assert_eq!(document.id, 1);
    assert_eq!(document.person_id, person.id);
    assert_eq!(document.upload_date, person.created_at + Duration::minutes(5));

    let owner = store.get(person.id).unwrap();
    assert_eq!(owner.documents, vec![document.clone()]);
    assert_eq!(owner.updated_at, document.created_at);
    assert_eq!(store.get_document(document.id).unwrap(), document);
}

#[test]
fn add_document_to_unknown_person_is_not_found() {
    let (store, _) = fixture();

    let err = store.add_document(9, &passport()).unwrap_err();
    assert_eq!(err, RegistryError::NotFound(EntityRef::Person(9)));
}

#[test]
fn document_ids_are_registry_wide() {
    let (store, _) = fixture();
    let mario = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    let giulia = store.create(&PersonDraft::new("Giulia", "Bianchi")).unwrap();

    let first = store.add_document(mario.id, &passport()).unwrap();
    let second = store.add_document(giulia.id, &passport()).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn update_document_keeps_identity() {
    let (store, clock) = fixture();
    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    let document = store.add_document(person.id, &passport()).unwrap();

    clock.advance(Duration::days(1));
    let mut draft = document.to_draft();
    draft.name = "Passaporto rinnovato".to_string();
    draft.expiry_date = NaiveDate::from_ymd_opt(2035, 1, 1);
    let updated = store.update_document(document.id, &draft).unwrap();

    assert_eq!(updated.id, document.id);
    assert_eq!(updated.person_id, person.id);
    assert_eq!(updated.created_at, document.created_at);
    assert_eq!(updated.upload_date, document.upload_date);
    assert_eq!(updated.updated_at, document.created_at + Duration::days(1));
    assert_eq!(updated.name, "Passaporto rinnovato");
}

#[test]
fn remove_document_returns_removed_row() {
    let (store, _) = fixture();
    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    let document = store.add_document(person.id, &passport()).unwrap();

    let removed = store.remove_document(document.id).unwrap();
    assert_eq!(removed, document);
    assert!(store.get(person.id).unwrap().documents.is_empty());
    assert!(matches!(
        store.remove_document(document.id),
        Err(RegistryError::NotFound(EntityRef::Document(_)))
    ));
}

#[test]
fn person_update_keeps_document_ids_from_draft() {
    let (store, _) = fixture();
    let draft = PersonDraft::new("Mario", "Rossi").with_document(passport());
    let person = store.create(&draft).unwrap();
    let original = person.documents[0].clone();

    let mut edit = person.to_draft();
    edit.notes = Some("rinnovo".to_string());
    edit.documents.push(DocumentDraft::new("Patente", DocumentType::DrivingLicense));
    let updated = store.update(person.id, &edit).unwrap();

    assert_eq!(updated.documents[0], original);
    assert!(updated.documents[1].id > original.id);
}

#[test]
fn person_update_rejects_foreign_document_id() {
    let (store, _) = fixture();
    let mario = store
        .create(&PersonDraft::new("Mario", "Rossi").with_document(passport()))
        .unwrap();
    let giulia = store.create(&PersonDraft::new("Giulia", "Bianchi")).unwrap();

    let mut stolen = giulia.to_draft();
    stolen.documents.push(mario.documents[0].to_draft());
    let err = store.update(giulia.id, &stolen).unwrap_err();

    assert_eq!(
        err,
        RegistryError::NotFound(EntityRef::Document(mario.documents[0].id))
    );
    assert_eq!(store.get(mario.id).unwrap(), mario);
}

#[test]
fn delete_person_removes_owned_documents() {
    let (store, _) = fixture();
    let person = store
        .create(&PersonDraft::new("Mario", "Rossi").with_document(passport()))
        .unwrap();
    let document_id = person.documents[0].id;

    assert!(store.delete(person.id));
    assert!(matches!(
        store.get_document(document_id),
        Err(RegistryError::NotFound(EntityRef::Document(_)))
    ));
}

#[test]
fn relationship_to_self_is_invalid() {
    let (store, _) = fixture();
    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();

    let err = store
        .add_relationship(
            person.id,
            &RelationshipDraft::new(person.id, RelationshipType::Friend),
        )
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::InvalidReference(ReferenceError::SelfReference {
            person_id: person.id
        })
    );
}

#[test]
fn relationship_to_unknown_person_is_invalid() {
    let (store, _) = fixture();
    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();

    let err = store
        .add_relationship(person.id, &RelationshipDraft::new(77, RelationshipType::Client))
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::InvalidReference(ReferenceError::UnknownPerson {
            related_person_id: 77,
            ..
        })
    ));
    assert!(store.get(person.id).unwrap().relationships.is_empty());
}

#[test]
fn relationship_lifecycle() {
    let (store, _) = fixture();
    let mario = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    let giulia = store.create(&PersonDraft::new("Giulia", "Bianchi")).unwrap();

    let relationship = store
        .add_relationship(
            mario.id,
            &RelationshipDraft::new(giulia.id, RelationshipType::Client),
        )
        .unwrap();
    assert_eq!(relationship.person_id, mario.id);
    assert!(relationship.is_active);

    let toggled = store.set_relationship_active(relationship.id, false).unwrap();
    assert!(!toggled.is_active);
    assert_eq!(toggled.created_at, relationship.created_at);

    let mut draft = toggled.to_draft();
    draft.relationship_type = RelationshipType::Partner;
    let updated = store.update_relationship(relationship.id, &draft).unwrap();
    assert_eq!(updated.relationship_type, RelationshipType::Partner);
    assert_eq!(store.get_relationship(relationship.id).unwrap(), updated);

    let removed = store.remove_relationship(relationship.id).unwrap();
    assert_eq!(removed, updated);
    assert!(matches!(
        store.get_relationship(relationship.id),
        Err(RegistryError::NotFound(EntityRef::Relationship(_)))
    ));
}

#[test]
fn deleting_target_prunes_inbound_relationships() {
    let (store, clock) = fixture();
    let mario = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    let giulia = store.create(&PersonDraft::new("Giulia", "Bianchi")).unwrap();
    let relationship = store
        .add_relationship(
            mario.id,
            &RelationshipDraft::new(giulia.id, RelationshipType::Client),
        )
        .unwrap();

    clock.advance(Duration::hours(1));
    assert!(store.delete(giulia.id));

    let mario_now = store.get(mario.id).unwrap();
    assert!(mario_now.relationships.is_empty());
    assert_eq!(mario_now.updated_at, relationship.created_at + Duration::hours(1));
    assert!(store.get_relationship(relationship.id).is_err());
}
