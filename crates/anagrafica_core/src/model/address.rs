//! Postal address embedded in a person record.

use super::{require_single_primary, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Address category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    Home,
    Work,
    Other,
}

impl AddressType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
            Self::Other => "Other",
        }
    }
}

/// Postal address owned by a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub country: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: AddressType,
    #[serde(default)]
    pub is_primary: bool,
}

impl Address {
    /// Checks required fields of one address.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.street, "address", "street")?;
        require_text(&self.city, "address", "city")?;
        require_text(&self.postal_code, "address", "postal_code")?;
        require_text(&self.province, "address", "province")?;
        require_text(&self.country, "address", "country")?;
        Ok(())
    }
}

/// Validates every address and the one-primary-per-type rule.
pub fn validate_addresses(addresses: &[Address]) -> Result<(), ValidationError> {
    for address in addresses {
        address.validate()?;
    }
    require_single_primary(
        addresses.iter().map(|a| (a.kind, a.is_primary)),
        "address",
        |kind| kind.as_str(),
    )
}
