//! Shared model types: status/priority enums, entity kinds, timestamps and
//! field validation.
//!
//! # Invariants
//! - Enum literals match the persisted/JSON form exactly (`"In Progress"`).
//! - Timestamps are UTC with microsecond precision so that their rendered
//!   form sorts lexicographically in time order.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Store-assigned timestamp type.
pub type Timestamp = DateTime<Utc>;

/// Kind of entity, used in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Project,
    Task,
    TimeEntry,
    Article,
}

impl EntityKind {
    /// Stable snake_case label used in logs and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Project => "project",
            Self::Task => "task",
            Self::TimeEntry => "time_entry",
            Self::Article => "article",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work lifecycle shared by projects and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkStatus {
    /// Accepted but not started.
    Incoming,
    /// Work is underway.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Work delivered.
    Completed,
    /// Work delivered and billed.
    Invoiced,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 4] = [
        Self::Incoming,
        Self::InProgress,
        Self::Completed,
        Self::Invoiced,
    ];

    /// Exact literal used in storage and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "Incoming",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Invoiced => "Invoiced",
        }
    }
}

impl FromStr for WorkStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidEnumValue {
                field: "status",
                value: value.to_string(),
            })
    }
}

impl Display for WorkStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Medium, Self::High];

    /// Exact literal used in storage and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidEnumValue {
                field: "priority",
                value: value.to_string(),
            })
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failure. Never fatal; the write is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    BlankField {
        entity: EntityKind,
        field: &'static str,
    },
    /// Enum field holds a value outside its fixed set.
    InvalidEnumValue { field: &'static str, value: String },
    /// Email does not have a `local@domain.tld` shape.
    InvalidEmail(String),
    /// Rate is negative, NaN or infinite.
    InvalidRate {
        entity: EntityKind,
        field: &'static str,
        value: f64,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} must not be blank")
            }
            Self::InvalidEnumValue { field, value } => {
                write!(f, "invalid {field} value `{value}`")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::InvalidRate {
                entity,
                field,
                value,
            } => write!(
                f,
                "{entity}.{field} must be a finite non-negative number, got {value}"
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}

pub(crate) fn check_rate(
    entity: EntityKind,
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    match value {
        Some(rate) if !rate.is_finite() || rate < 0.0 => Err(ValidationError::InvalidRate {
            entity,
            field,
            value: rate,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_email(value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(email) if !EMAIL_RE.is_match(email) => {
            Err(ValidationError::InvalidEmail(email.to_string()))
        }
        _ => Ok(()),
    }
}

/// Renders a timestamp in the fixed-width ISO-8601 form used for storage.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored ISO-8601 timestamp.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Deserializes a nullable patch field: absent stays `None`, explicit
/// `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
