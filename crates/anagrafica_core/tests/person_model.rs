use anagrafica_core::model::person::normalize_fiscal_code;
use anagrafica_core::{
    Address, AddressType, Contact, ContactType, DocumentDraft, DocumentType, Gender, PersonDraft,
    RelationshipCategory, RelationshipType, ValidationError,
};

fn home(street: &str) -> Address {
    Address {
        street: street.to_string(),
        city: "Milano".to_string(),
        postal_code: "20100".to_string(),
        province: "MI".to_string(),
        country: "Italia".to_string(),
        kind: AddressType::Home,
        is_primary: false,
    }
}

#[test]
fn draft_requires_first_and_last_name() {
    let err = PersonDraft::new("Mario", "").validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingField {
            entity: "person",
            field: "last_name"
        }
    );
}

#[test]
fn names_need_two_characters_after_trimming() {
    let err = PersonDraft::new(" M ", "Rossi").validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::TooShort {
            entity: "person",
            field: "first_name",
            min: 2
        }
    );
    assert!(err.to_string().contains("at least 2"));

    let err = PersonDraft::new("Mario", "R").validate().unwrap_err();
    assert!(matches!(
        err,
        ValidationError::TooShort {
            field: "last_name",
            ..
        }
    ));

    assert!(PersonDraft::new("Lù", "Ng").validate().is_ok());
}

#[test]
fn address_requires_every_text_field() {
    let mut address = home("Via Roma 123");
    address.province = " ".to_string();

    let err = PersonDraft::new("Mario", "Rossi")
        .with_address(address)
        .validate()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingField {
            entity: "address",
            field: "province"
        }
    );
}

#[test]
fn contact_requires_value() {
    let err = PersonDraft::new("Mario", "Rossi")
        .with_contact(Contact::new(ContactType::Email, ""))
        .validate()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::MissingField {
            entity: "contact",
            field: "value"
        }
    ));
}

#[test]
fn one_primary_per_contact_type() {
    let draft = PersonDraft::new("Mario", "Rossi")
        .with_contact(Contact::new(ContactType::Email, "a@example.com").primary())
        .with_contact(Contact::new(ContactType::Phone, "+39 02 1").primary());
    assert!(draft.validate().is_ok());

    let err = draft
        .with_contact(Contact::new(ContactType::Email, "b@example.com").primary())
        .validate()
        .unwrap_err();
    assert!(matches!(err, ValidationError::DuplicatePrimary { .. }));
}

#[test]
fn one_primary_per_address_type() {
    let mut first = home("Via Roma 1");
    first.is_primary = true;
    let mut second = home("Via Roma 2");
    second.is_primary = true;

    let err = PersonDraft::new("Mario", "Rossi")
        .with_address(first)
        .with_address(second)
        .validate()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::DuplicatePrimary {
            entity: "address",
            ..
        }
    ));
}

#[test]
fn document_requires_name() {
    let err = PersonDraft::new("Mario", "Rossi")
        .with_document(DocumentDraft::new(" ", DocumentType::Passport))
        .validate()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::MissingField {
            entity: "document",
            field: "name"
        }
    ));
}

#[test]
fn duplicate_document_ids_in_draft_are_rejected() {
    let mut first = DocumentDraft::new("Passaporto", DocumentType::Passport);
    first.id = Some(7);
    let mut second = DocumentDraft::new("Patente", DocumentType::DrivingLicense);
    second.id = Some(7);

    let err = PersonDraft::new("Mario", "Rossi")
        .with_document(first)
        .with_document(second)
        .validate()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::DuplicateId {
            entity: "document",
            id: 7
        }
    );
}

#[test]
fn fiscal_code_format() {
    assert_eq!(
        normalize_fiscal_code("bncgli90l62f205x").unwrap().as_deref(),
        Some("BNCGLI90L62F205X")
    );
    assert_eq!(normalize_fiscal_code("   ").unwrap(), None);
    assert!(matches!(
        normalize_fiscal_code("BNCGLI90L62F205"),
        Err(ValidationError::InvalidFiscalCode(_))
    ));
}

#[test]
fn draft_json_defaults() {
    let draft: PersonDraft =
        serde_json::from_str(r#"{"first_name": "Luca", "last_name": "Verdi", "gender": "M"}"#)
            .unwrap();
    assert!(draft.is_active);
    assert!(draft.documents.is_empty());
    assert_eq!(draft.gender, Some(Gender::Male));
}

#[test]
fn document_draft_uses_type_key() {
    let draft = DocumentDraft::new("Carta d'identità", DocumentType::IdentityCard);
    let json = serde_json::to_value(&draft).unwrap();
    assert_eq!(json["type"], "identity_card");
}

#[test]
fn labels_are_total() {
    for kind in DocumentType::ALL {
        assert!(!kind.label().is_empty());
        assert!(!kind.as_str().is_empty());
    }
    assert_eq!(ContactType::Mobile.label(), "Mobile");
    assert_eq!(AddressType::Work.as_str(), "work");
}

#[test]
fn relationship_categories() {
    assert_eq!(
        RelationshipType::Client.category(),
        RelationshipCategory::Commercial
    );
    assert_eq!(RelationshipType::Colleague.category(), RelationshipCategory::Work);
    assert_eq!(RelationshipType::Sibling.category(), RelationshipCategory::Family);
    assert_eq!(RelationshipType::Friend.category(), RelationshipCategory::Other);
}
