//! Document expiry classification and the composite expiry ordering.
//!
//! # Invariants
//! - `days_to_expiry = ceil((expiry − as_of) / 1 day)`, with the expiry date
//!   taken as the start of that day in UTC.
//! - Tier rules are evaluated in order: `< 0` and `<= 7` critical, `<= 15`
//!   high, `<= 30` medium, otherwise low; no expiry date means `none`.
//! - Ordering: tier rank, then days ascending (absent last), then upload date
//!   descending. Ties keep input order.

use crate::model::document::Document;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Urgency of a document's expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTier {
    Critical,
    High,
    Medium,
    Low,
    None,
}

impl ExpiryTier {
    /// Sort rank; lower is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::None => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::None => "No expiry",
        }
    }

    fn for_days(days: i64) -> Self {
        // Already expired documents are critical as well.
        if days <= 7 {
            Self::Critical
        } else if days <= 15 {
            Self::High
        } else if days <= 30 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Classification result for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryClass {
    pub days_to_expiry: Option<i64>,
    pub tier: ExpiryTier,
}

/// List-view status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Expired,
    Expiring,
    Valid,
}

fn expiry_instant(expiry_date: NaiveDate) -> DateTime<Utc> {
    expiry_date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Whole days until `expiry_date`, rounded up.
pub fn days_to_expiry(expiry_date: NaiveDate, as_of: DateTime<Utc>) -> i64 {
    let millis = (expiry_instant(expiry_date) - as_of).num_milliseconds();
    -((-millis).div_euclid(MILLIS_PER_DAY))
}

pub fn classify(document: &Document, as_of: DateTime<Utc>) -> ExpiryClass {
    match document.expiry_date {
        None => ExpiryClass {
            days_to_expiry: None,
            tier: ExpiryTier::None,
        },
        Some(expiry_date) => {
            let days = days_to_expiry(expiry_date, as_of);
            ExpiryClass {
                days_to_expiry: Some(days),
                tier: ExpiryTier::for_days(days),
            }
        }
    }
}

/// Composite key shared by the document list and the reminder views.
pub(crate) fn sort_key(
    class: ExpiryClass,
    upload_date: DateTime<Utc>,
) -> (u8, bool, i64, Reverse<DateTime<Utc>>) {
    (
        class.tier.rank(),
        class.days_to_expiry.is_none(),
        class.days_to_expiry.unwrap_or(0),
        Reverse(upload_date),
    )
}

pub fn compare_by_expiry(a: &Document, b: &Document, as_of: DateTime<Utc>) -> Ordering {
    sort_key(classify(a, as_of), a.upload_date).cmp(&sort_key(classify(b, as_of), b.upload_date))
}

/// Stable in-place sort by the composite expiry order.
pub fn sort_by_expiry(documents: &mut [Document], as_of: DateTime<Utc>) {
    documents
        .sort_by_cached_key(|document| sort_key(classify(document, as_of), document.upload_date));
}

/// `expired` once the expiry instant has passed, `expiring` within
/// `window_days`, `valid` otherwise (including no expiry date).
pub fn document_status(
    document: &Document,
    as_of: DateTime<Utc>,
    window_days: u32,
) -> DocumentStatus {
    let Some(expiry_date) = document.expiry_date else {
        return DocumentStatus::Valid;
    };
    if expiry_instant(expiry_date) < as_of {
        return DocumentStatus::Expired;
    }
    let days = days_to_expiry(expiry_date, as_of);
    if days > 0 && days <= i64::from(window_days) {
        DocumentStatus::Expiring
    } else {
        DocumentStatus::Valid
    }
}

/// Short human description of a days-to-expiry value.
pub fn describe_days_left(days: i64) -> String {
    match days {
        d if d < 0 => format!("expired {} days ago", d.unsigned_abs()),
        0 => "expires today".to_string(),
        1 => "expires tomorrow".to_string(),
        d => format!("{d} days"),
    }
}

/// 1024-based size with up to two decimals, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
