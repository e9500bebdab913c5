//! Demo entry point for the registry core.
//!
//! # Responsibility
//! - Wire configuration, logging, store and service together.
//! - Seed the demo registry and print the dashboard views as JSON.
//!
//! Usage: `anagrafica-cli [config.json]`

use anagrafica_core::{
    core_version, init_logging_from_config, Address, AddressType, Contact, ContactType,
    DocumentDraft, DocumentType, PersonDraft, PersonRepository, RegistryConfig, RegistryService,
    RegistryStore, RelationshipType,
};
use chrono::{Days, NaiveDate, Utc};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("anagrafica-cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args().nth(1) {
        Some(path) => RegistryConfig::from_file(&path).map_err(|err| err.to_string())?,
        None => RegistryConfig::default(),
    };
    init_logging_from_config(&config)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let store = RegistryStore::from_config(&config);
    let service = RegistryService::new(store, config);
    seed(&service).map_err(|err| format!("failed to seed demo registry: {err}"))?;

    let statistics = service.statistics();
    let dashboard = service.dashboard_reminders();
    println!(
        "{}",
        statistics
            .to_json_pretty()
            .map_err(|err| format!("failed to encode statistics: {err}"))?
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&dashboard)
            .map_err(|err| format!("failed to encode reminders: {err}"))?
    );
    info!(
        "event=cli_done module=cli status=ok persons={} reminders={} critical={}",
        statistics.total_persons,
        dashboard.items.len(),
        dashboard.critical_count
    );
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {year}-{month}-{day}"))
}

fn address(
    street: &str,
    city: &str,
    postal_code: &str,
    province: &str,
    kind: AddressType,
) -> Address {
    Address {
        street: street.to_string(),
        city: city.to_string(),
        postal_code: postal_code.to_string(),
        province: province.to_string(),
        country: "Italia".to_string(),
        kind,
        is_primary: false,
    }
}

fn contact(kind: ContactType, value: &str, label: &str) -> Contact {
    let mut contact = Contact::new(kind, value).primary();
    contact.label = Some(label.to_string());
    contact
}

/// Three demo persons, a few documents around today's date and two links.
fn seed<R: PersonRepository>(service: &RegistryService<R>) -> Result<(), Box<dyn Error>> {
    let today = Utc::now().date_naive();
    let in_days = |days: u64| {
        today
            .checked_add_days(Days::new(days))
            .ok_or_else(|| format!("date overflow adding {days} days"))
    };

    let mut mario = PersonDraft::new("Mario", "Rossi")
        .born_on(date(1985, 3, 15)?)
        .with_address(address("Via Roma 123", "Milano", "20100", "MI", AddressType::Home))
        .with_contact(contact(ContactType::Email, "mario.rossi@email.com", "Email personale"))
        .with_contact(contact(ContactType::Phone, "+39 02 1234567", "Telefono casa"))
        .with_document(
            DocumentDraft::new("Carta d'identità", DocumentType::IdentityCard)
                .with_expiry(in_days(5)?),
        );
    mario.fiscal_code = Some("RSSMRA85C15H501Z".to_string());
    mario.profession = Some("Ingegnere".to_string());
    mario.notes = Some("Cliente di lunga data".to_string());

    let mut giulia = PersonDraft::new("Giulia", "Bianchi")
        .born_on(date(1990, 7, 22)?)
        .with_address(address("Corso Venezia 45", "Milano", "20121", "MI", AddressType::Work))
        .with_contact(contact(ContactType::Email, "giulia.bianchi@studio.it", "Email lavoro"))
        .with_contact(contact(ContactType::Mobile, "+39 333 1234567", "Cellulare"))
        .with_document(
            DocumentDraft::new("Passaporto", DocumentType::Passport).with_expiry(in_days(40)?),
        );
    giulia.fiscal_code = Some("BNCGLI90L62F205X".to_string());
    giulia.profession = Some("Avvocato".to_string());

    let mut luca = PersonDraft::new("Luca", "Verdi")
        .born_on(date(1978, 11, 8)?)
        .with_address(address("Via Garibaldi 78", "Roma", "00100", "RM", AddressType::Home))
        .with_contact(contact(ContactType::Email, "luca.verdi@ospedale.it", "Email professionale"))
        .with_contact(contact(ContactType::Phone, "+39 06 9876543", "Telefono studio"))
        .with_document(
            DocumentDraft::new("Patente", DocumentType::DrivingLicense).with_expiry(in_days(12)?),
        )
        .with_document(DocumentDraft::new("Contratto di consulenza", DocumentType::Contract));
    luca.fiscal_code = Some("VRDLCU78S08L219Y".to_string());
    luca.profession = Some("Medico".to_string());

    let mario = service.create(&mario)?;
    let giulia = service.create(&giulia)?;
    let luca = service.create(&luca)?;

    service.link(mario.id, giulia.id, RelationshipType::Client)?;
    service.link(luca.id, mario.id, RelationshipType::Friend)?;
    Ok(())
}
