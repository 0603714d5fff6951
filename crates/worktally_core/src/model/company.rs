//! Company (client) model.
//!
//! # Invariants
//! - `name` is never blank.
//! - `email`, when set, has an address shape.
//! - `hourly_rate`, when set, is finite and non-negative.

use crate::model::common::{
    check_email, check_rate, double_option, require_text, EntityKind, Timestamp, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CompanyId = Uuid;

/// Client company record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Default billing rate for work done for this client.
    pub hourly_rate: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Caller-supplied fields for creating a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
}

impl NewCompany {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a company. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub hourly_rate: Option<Option<f64>>,
}

impl Company {
    /// Builds a record with a fresh id; `now` becomes both timestamps.
    pub fn from_new(input: NewCompany, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            contact: input.contact,
            address: input.address,
            email: input.email,
            phone: input.phone,
            hourly_rate: input.hourly_rate,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `patch` into this record. Identity and timestamps are untouched.
    pub fn apply(&mut self, patch: CompanyPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(contact) = patch.contact {
            self.contact = contact;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(hourly_rate) = patch.hourly_rate {
            self.hourly_rate = hourly_rate;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(EntityKind::Company, "name", &self.name)?;
        check_email(self.email.as_deref())?;
        check_rate(EntityKind::Company, "hourly_rate", self.hourly_rate)?;
        Ok(())
    }
}
