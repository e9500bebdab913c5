use anagrafica_core::{
    Clock, Contact, ContactType, DocumentDraft, DocumentType, EntityRef, ManualClock,
    PersonDraft, PersonRepository, RegistryError, RegistryStore, ValidationError,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use crossbeam::channel::{self, Receiver, Sender};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

fn store_at_fixed_time() -> (RegistryStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap(),
    ));
    let store = RegistryStore::new().with_clock(clock.clone());
    (store, clock)
}

#[test]
fn create_assigns_id_and_timestamps() {
    let (store, clock) = store_at_fixed_time();

    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    assert_eq!(person.id, 1);
    assert_eq!(person.created_at, clock.now());
    assert_eq!(person.updated_at, person.created_at);
    assert!(person.is_active);
}

#[test]
fn get_returns_created_person() {
    let (store, _) = store_at_fixed_time();

    let draft = PersonDraft::new("Giulia", "Bianchi")
        .with_contact(Contact::new(ContactType::Email, "giulia@studio.it").primary());
    let created = store.create(&draft).unwrap();

    let loaded = store.get(created.id).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.to_draft(), draft);
}

#[test]
fn ids_are_monotonic_and_never_reused() {
    let (store, _) = store_at_fixed_time();

    let first = store.create(&PersonDraft::new("Anna", "One")).unwrap();
    let second = store.create(&PersonDraft::new("Bruno", "Two")).unwrap();
    assert!(store.delete(second.id));

    let third = store.create(&PersonDraft::new("Carla", "Three")).unwrap();
    assert!(second.id > first.id);
    assert!(third.id > second.id);
}

#[test]
fn failed_create_does_not_consume_an_id() {
    let (store, _) = store_at_fixed_time();

    let err = store.create(&PersonDraft::new("  ", "Rossi")).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::MissingField {
            field: "first_name",
            ..
        })
    ));

    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    assert_eq!(person.id, 1);
    assert!(store.snapshot().get(1).is_some());
}

#[test]
fn update_replaces_fields_and_restamps() {
    let (store, clock) = store_at_fixed_time();
    let created = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();

    clock.advance(Duration::hours(2));
    let mut draft = created.to_draft();
    draft.last_name = "Rossini".to_string();
    draft.profession = Some("Ingegnere".to_string());
    let updated = store.update(created.id, &draft).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.last_name, "Rossini");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, created.created_at + Duration::hours(2));
}

#[test]
fn update_is_whole_record_replacement() {
    let (store, _) = store_at_fixed_time();
    let draft = PersonDraft::new("Mario", "Rossi")
        .with_contact(Contact::new(ContactType::Phone, "+39 02 1234567"));
    let created = store.create(&draft).unwrap();

    let updated = store
        .update(created.id, &PersonDraft::new("Mario", "Rossi"))
        .unwrap();
    assert!(updated.contacts.is_empty());
}

#[test]
fn update_unknown_person_is_not_found() {
    let (store, _) = store_at_fixed_time();

    let err = store
        .update(42, &PersonDraft::new("Mario", "Rossi"))
        .unwrap_err();
    assert_eq!(err, RegistryError::NotFound(EntityRef::Person(42)));
    assert!(store.is_empty());
}

#[test]
fn invalid_update_leaves_person_untouched() {
    let (store, _) = store_at_fixed_time();
    let created = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();

    let mut draft = created.to_draft();
    draft.first_name = "Marco".to_string();
    draft.fiscal_code = Some("not-a-code".to_string());
    let err = store.update(created.id, &draft).unwrap_err();

    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::InvalidFiscalCode(_))
    ));
    assert_eq!(store.get(created.id).unwrap(), created);
}

#[test]
fn delete_then_get_is_not_found_and_second_delete_is_false() {
    let (store, _) = store_at_fixed_time();
    let created = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();

    assert!(store.delete(created.id));
    assert!(matches!(
        store.get(created.id),
        Err(RegistryError::NotFound(EntityRef::Person(_)))
    ));
    assert!(!store.delete(created.id));
}

#[test]
fn list_is_in_insertion_order() {
    let (store, _) = store_at_fixed_time();
    for (first, last) in [("Mario", "Rossi"), ("Giulia", "Bianchi"), ("Luca", "Verdi")] {
        store.create(&PersonDraft::new(first, last)).unwrap();
    }

    let names: Vec<String> = store.list().iter().map(|p| p.full_name()).collect();
    assert_eq!(names, ["Mario Rossi", "Giulia Bianchi", "Luca Verdi"]);
}

#[test]
fn list_returns_copies() {
    let (store, _) = store_at_fixed_time();
    let created = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();

    let mut listed = store.list();
    listed[0].first_name = "Changed".to_string();
    listed.clear();

    assert_eq!(store.list().len(), 1);
    assert_eq!(store.get(created.id).unwrap().first_name, "Mario");
}

#[test]
fn snapshots_are_immutable_and_versioned() {
    let (store, _) = store_at_fixed_time();
    let before = store.snapshot();
    assert_eq!(before.version(), 0);

    store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    let after = store.snapshot();

    assert!(before.is_empty());
    assert_eq!(after.len(), 1);
    assert_eq!(after.version(), 1);
}

#[test]
fn fiscal_code_is_normalized() {
    let (store, _) = store_at_fixed_time();
    let mut draft = PersonDraft::new("Mario", "Rossi");
    draft.fiscal_code = Some(" rssmra85c15h501z ".to_string());

    let person = store.create(&draft).unwrap();
    assert_eq!(person.fiscal_code.as_deref(), Some("RSSMRA85C15H501Z"));
}

#[test]
fn concurrent_creates_issue_distinct_ids() {
    let store = Arc::new(RegistryStore::new());
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                (0..25)
                    .map(|n| {
                        store
                            .create(&PersonDraft::new(format!("W{worker}"), format!("N{n}")))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 100);
    assert_eq!(store.snapshot().version(), 100);
}

/// Hands out scripted instants; a gated instant parks the caller until the
/// gate opens or a short timeout passes.
struct GatedClock {
    script: Mutex<VecDeque<(DateTime<Utc>, bool)>>,
    entered: Sender<()>,
    gate: Receiver<()>,
}

impl Clock for GatedClock {
    fn now(&self) -> DateTime<Utc> {
        let (at, gated) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("clock script exhausted");
        if gated {
            self.entered.send(()).unwrap();
            let _ = self.gate.recv_timeout(StdDuration::from_millis(200));
        }
        at
    }
}

#[test]
fn updated_at_follows_commit_order_under_contention() {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let slow_at = created + Duration::hours(1);
    let fast_at = created + Duration::hours(2);
    let (entered_tx, entered_rx) = channel::unbounded();
    let (gate_tx, gate_rx) = channel::unbounded();
    let clock = Arc::new(GatedClock {
        script: Mutex::new(VecDeque::from([
            (created, false),
            (slow_at, true),
            (fast_at, false),
        ])),
        entered: entered_tx,
        gate: gate_rx,
    });
    let store = Arc::new(RegistryStore::new().with_clock(clock));
    let person = store.create(&PersonDraft::new("Mario", "Rossi")).unwrap();
    let subscription = store.subscribe();

    let slow = {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
            let licence = DocumentDraft::new("Patente", DocumentType::DrivingLicense);
            store.add_document(person.id, &licence).unwrap()
        })
    };
    entered_rx.recv().unwrap();
    let passport = DocumentDraft::new("Passaporto", DocumentType::Passport);
    store.add_document(person.id, &passport).unwrap();
    gate_tx.send(()).unwrap();
    slow.join().unwrap();

    let stamps: Vec<_> = subscription
        .drain()
        .iter()
        .map(|snapshot| snapshot.get(person.id).unwrap().updated_at)
        .collect();
    assert_eq!(stamps, vec![slow_at, fast_at]);

    let stored = store.get(person.id).unwrap();
    assert_eq!(stored.created_at, created);
    assert_eq!(stored.updated_at, fast_at);
    assert!(stored.updated_at >= stored.created_at);
    assert_eq!(stored.documents.len(), 2);
}
