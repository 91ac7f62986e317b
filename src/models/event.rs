//! Event model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};

/// What an event offers: a ticketed happening or stock-tracked merchandise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Normal,
    Merchandise,
}

/// Lifecycle status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    Draft,
    Published,
    Ongoing,
    Closed,
}

/// Input type of a registration form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Dropdown,
    Checkbox,
    #[serde(rename = "file upload")]
    FileUpload,
}

/// One question on a Normal event's registration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub organizer_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub eligibility: Option<String>,
    pub tags: Vec<String>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub registration_limit: Option<i32>,
    pub registration_fee: Option<i32>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub variants: Vec<String>,
    /// Remaining merchandise stock
    pub quantity: Option<i32>,
    pub purchase_limit: i32,
    pub status: EventStatus,
    pub form: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.organizer_id == user_id
    }

    pub fn is_merchandise(&self) -> bool {
        self.kind == EventKind::Merchandise
    }

    /// Stock currently available for approval
    pub fn available_stock(&self) -> i32 {
        self.quantity.unwrap_or(0)
    }

    /// Form fields in display order
    pub fn sorted_form(&self) -> Vec<FormField> {
        let mut form = self.form.clone();
        form.sort_by_key(|field| field.order.unwrap_or(0));
        form
    }
}

impl<'r> FromRow<'r, PgRow> for Event {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;
        let form: Json<Vec<FormField>> = row.try_get("form")?;

        Ok(Self {
            id: row.try_get("id")?,
            organizer_id: row.try_get("organizer_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            kind: kind.parse().map_err(|e: ParseEnumError| sqlx::Error::Decode(Box::new(e)))?,
            eligibility: row.try_get("eligibility")?,
            tags: row.try_get("tags")?,
            registration_deadline: row.try_get("registration_deadline")?,
            event_start: row.try_get("event_start")?,
            event_end: row.try_get("event_end")?,
            registration_limit: row.try_get("registration_limit")?,
            registration_fee: row.try_get("registration_fee")?,
            sizes: row.try_get("sizes")?,
            colors: row.try_get("colors")?,
            variants: row.try_get("variants")?,
            quantity: row.try_get("quantity")?,
            purchase_limit: row.try_get("purchase_limit")?,
            status: status.parse().map_err(|e: ParseEnumError| sqlx::Error::Decode(Box::new(e)))?,
            form: form.0,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub eligibility: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub registration_limit: Option<i32>,
    pub registration_fee: Option<i32>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub variants: Vec<String>,
    pub quantity: Option<i32>,
    pub purchase_limit: Option<i32>,
    #[serde(default)]
    pub form: Vec<FormField>,
}

/// Partial event update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<EventKind>,
    pub eligibility: Option<String>,
    pub tags: Option<Vec<String>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub registration_limit: Option<i32>,
    pub registration_fee: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub variants: Option<Vec<String>>,
    pub quantity: Option<i32>,
    pub purchase_limit: Option<i32>,
    pub form: Option<Vec<FormField>>,
    pub status: Option<EventStatus>,
}

impl UpdateEventRequest {
    /// Names of the non-status fields present in the request
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() { fields.push("name"); }
        if self.description.is_some() { fields.push("description"); }
        if self.kind.is_some() { fields.push("kind"); }
        if self.eligibility.is_some() { fields.push("eligibility"); }
        if self.tags.is_some() { fields.push("tags"); }
        if self.registration_deadline.is_some() { fields.push("registration_deadline"); }
        if self.event_start.is_some() { fields.push("event_start"); }
        if self.event_end.is_some() { fields.push("event_end"); }
        if self.registration_limit.is_some() { fields.push("registration_limit"); }
        if self.registration_fee.is_some() { fields.push("registration_fee"); }
        if self.sizes.is_some() { fields.push("sizes"); }
        if self.colors.is_some() { fields.push("colors"); }
        if self.variants.is_some() { fields.push("variants"); }
        if self.quantity.is_some() { fields.push("quantity"); }
        if self.purchase_limit.is_some() { fields.push("purchase_limit"); }
        if self.form.is_some() { fields.push("form"); }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.present_fields().is_empty()
    }
}

/// Event as returned by single-event reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub registration_count: i64,
}

/// Filters for the published-event listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishedEventFilter {
    pub kind: Option<EventKind>,
    /// Case-insensitive substring match on the eligibility text
    pub eligibility: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub organizer_ids: Option<Vec<i64>>,
}

impl PublishedEventFilter {
    /// In-process evaluation of the filter, status excluded
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(ref needle) = self.eligibility {
            let haystack = event.eligibility.as_deref().unwrap_or("").to_lowercase();
            if !haystack.contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(start) = event.event_start else {
                return false;
            };
            if self.date_from.is_some_and(|from| start < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| start > to) {
                return false;
            }
        }
        if let Some(ref organizers) = self.organizer_ids {
            if !organizers.contains(&event.organizer_id) {
                return false;
            }
        }
        true
    }
}

/// Error returned when a stored enum label is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Normal => "Normal",
            EventKind::Merchandise => "Merchandise",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(EventKind::Normal),
            "Merchandise" => Ok(EventKind::Merchandise),
            other => Err(ParseEnumError { kind: "event kind", value: other.to_string() }),
        }
    }
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "Draft",
            EventStatus::Published => "Published",
            EventStatus::Ongoing => "Ongoing",
            EventStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(EventStatus::Draft),
            "Published" => Ok(EventStatus::Published),
            "Ongoing" => Ok(EventStatus::Ongoing),
            "Closed" => Ok(EventStatus::Closed),
            other => Err(ParseEnumError { kind: "event status", value: other.to_string() }),
        }
    }
}
