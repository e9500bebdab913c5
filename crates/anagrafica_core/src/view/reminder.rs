//! Document expiry reminders across the whole registry.
//!
//! # Invariants
//! - A document is selected when its expiry date lies in
//!   `[as_of, as_of + horizon_days]` (calendar days, inclusive); expired
//!   documents are selected only on request.
//! - Items follow the composite expiry order of [`super::expiry`].

use super::expiry::{classify, sort_key, ExpiryTier};
use crate::model::document::Document;
use crate::model::person::Person;
use crate::model::PersonId;
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

/// Horizon used by the dashboard reminder view.
pub const DEFAULT_REMINDER_HORIZON_DAYS: u32 = 60;

/// One document due for attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderItem {
    pub document: Document,
    pub owner_id: PersonId,
    pub owner_full_name: String,
    pub days_to_expiry: i64,
    pub tier: ExpiryTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderQuery {
    pub horizon_days: u32,
    pub include_expired: bool,
}

impl Default for ReminderQuery {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_REMINDER_HORIZON_DAYS,
            include_expired: false,
        }
    }
}

impl ReminderQuery {
    pub fn within(horizon_days: u32) -> Self {
        Self {
            horizon_days,
            ..Self::default()
        }
    }
}

/// Documents expiring within `horizon_days` of `as_of`, most urgent first.
pub fn reminders<'a, I>(persons: I, horizon_days: u32, as_of: DateTime<Utc>) -> Vec<ReminderItem>
where
    I: IntoIterator<Item = &'a Person>,
{
    reminders_with(persons, ReminderQuery::within(horizon_days), as_of)
}

pub fn reminders_with<'a, I>(
    persons: I,
    query: ReminderQuery,
    as_of: DateTime<Utc>,
) -> Vec<ReminderItem>
where
    I: IntoIterator<Item = &'a Person>,
{
    let today = as_of.date_naive();
    let last_day = today
        .checked_add_days(Days::new(u64::from(query.horizon_days)))
        .unwrap_or(chrono::NaiveDate::MAX);

    let mut items = Vec::new();
    for person in persons {
        for document in &person.documents {
            let Some(expiry_date) = document.expiry_date else {
                continue;
            };
            let in_window = expiry_date >= today && expiry_date <= last_day;
            let expired = expiry_date < today;
            if !(in_window || (query.include_expired && expired)) {
                continue;
            }
            let class = classify(document, as_of);
            items.push((
                sort_key(class, document.upload_date),
                ReminderItem {
                    document: document.clone(),
                    owner_id: person.id,
                    owner_full_name: person.full_name(),
                    days_to_expiry: class.days_to_expiry.unwrap_or_default(),
                    tier: class.tier,
                },
            ));
        }
    }
    // Stable: equal keys keep registry order.
    items.sort_by(|left, right| left.0.cmp(&right.0));
    items.into_iter().map(|(_, item)| item).collect()
}

/// Whether the caller should raise an interrupt-level notification.
pub fn has_critical(items: &[ReminderItem]) -> bool {
    items.iter().any(|item| item.tier == ExpiryTier::Critical)
}

pub fn critical_count(items: &[ReminderItem]) -> usize {
    items
        .iter()
        .filter(|item| item.tier == ExpiryTier::Critical)
        .count()
}
