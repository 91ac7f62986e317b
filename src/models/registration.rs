//! Registration model
//!
//! A registration is one participant's claim against one event: a ticket for
//! Normal events, an order awaiting payment approval for Merchandise events.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};

use super::event::{Event, EventKind, EventStatus, ParseEnumError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Attended,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

/// Answer to one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    pub label: String,
    pub value: serde_json::Value,
}

impl FormResponse {
    /// Whether the answer carries any content
    pub fn is_filled(&self) -> bool {
        match &self.value {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.trim().is_empty(),
            serde_json::Value::Array(items) => !items.is_empty(),
            serde_json::Value::Bool(checked) => *checked,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub participant_id: i64,
    pub status: RegistrationStatus,
    pub responses: Vec<FormResponse>,
    pub ticket_id: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub variant: Option<String>,
    pub quantity: i32,
    pub payment_proof: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub attended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_cancelled(&self) -> bool {
        self.status == RegistrationStatus::Cancelled
    }

    /// Whether this order's quantity has been taken out of event stock
    pub fn holds_stock(&self) -> bool {
        self.payment_status == Some(PaymentStatus::Approved)
    }
}

impl<'r> FromRow<'r, PgRow> for Registration {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let payment_status: Option<String> = row.try_get("payment_status")?;
        let responses: Json<Vec<FormResponse>> = row.try_get("responses")?;

        Ok(Self {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            participant_id: row.try_get("participant_id")?,
            status: status.parse().map_err(|e: ParseEnumError| sqlx::Error::Decode(Box::new(e)))?,
            responses: responses.0,
            ticket_id: row.try_get("ticket_id")?,
            size: row.try_get("size")?,
            color: row.try_get("color")?,
            variant: row.try_get("variant")?,
            quantity: row.try_get("quantity")?,
            payment_proof: row.try_get("payment_proof")?,
            payment_status: payment_status
                .map(|s| s.parse())
                .transpose()
                .map_err(|e: ParseEnumError| sqlx::Error::Decode(Box::new(e)))?,
            attended_at: row.try_get("attended_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Participant-submitted registration attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub event_id: i64,
    #[serde(default)]
    pub responses: Vec<FormResponse>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub variant: Option<String>,
    pub quantity: Option<i32>,
    pub payment_proof: Option<String>,
}

/// Row the admission controller asks the store to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegistration {
    pub event_id: i64,
    pub participant_id: i64,
    pub status: RegistrationStatus,
    pub responses: Vec<FormResponse>,
    pub ticket_id: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub variant: Option<String>,
    pub quantity: i32,
    pub payment_proof: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

/// Result of an atomic admission insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Registration),
    Duplicate,
    CapacityReached,
}

/// Result of an atomic payment-proof replacement
#[derive(Debug, Clone, PartialEq)]
pub enum ProofOutcome {
    Replaced(Registration),
    /// Already approved, or the order no longer exists
    Unchanged,
    /// Reopening a rejected order would exceed the registration limit
    CapacityReached,
}

/// Organizer decision on a pending merchandise order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDecision {
    Approve { ticket_id: String },
    Reject,
}

/// Successful admission: a ticket was issued or an order awaits payment review
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "registration", rename_all = "snake_case")]
pub enum Admission {
    Ticketed(Registration),
    OrderPlaced(Registration),
}

impl Admission {
    pub fn registration(&self) -> &Registration {
        match self {
            Admission::Ticketed(registration) | Admission::OrderPlaced(registration) => registration,
        }
    }

    pub fn into_registration(self) -> Registration {
        match self {
            Admission::Ticketed(registration) | Admission::OrderPlaced(registration) => registration,
        }
    }
}

/// Event fields shown next to a participant's registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub kind: Option<EventKind>,
    pub status: Option<EventStatus>,
    pub organizer_id: Option<i64>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub registration_fee: Option<i32>,
    pub deleted: bool,
}

impl EventSummary {
    pub const DELETED_EVENT_NAME: &'static str = "Deleted Event";

    /// Placeholder for registrations whose event no longer exists
    pub fn deleted(event_id: i64) -> Self {
        Self {
            id: event_id,
            name: Self::DELETED_EVENT_NAME.to_string(),
            kind: None,
            status: None,
            organizer_id: None,
            event_start: None,
            event_end: None,
            registration_fee: None,
            deleted: true,
        }
    }
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            kind: Some(event.kind),
            status: Some(event.status),
            organizer_id: Some(event.organizer_id),
            event_start: event.event_start,
            event_end: event.event_end,
            registration_fee: event.registration_fee,
            deleted: false,
        }
    }
}

/// Registration history entry for a participant
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationWithEvent {
    pub registration: Registration,
    pub event: EventSummary,
}

/// Contact details shown to organizers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

/// Registration as listed for the owning organizer
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantEntry {
    pub registration: Registration,
    pub participant: ParticipantInfo,
}

/// Confirmation returned by a successful ticket scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReceipt {
    pub registration_id: i64,
    pub event_id: i64,
    pub ticket_id: String,
    pub participant: ParticipantInfo,
    pub attended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceEntry {
    pub registration_id: i64,
    pub participant: ParticipantInfo,
    pub ticket_id: Option<String>,
    pub attended_at: Option<DateTime<Utc>>,
}

/// Check-in overview for one event
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceDashboard {
    pub event_id: i64,
    pub total: usize,
    pub attended_count: usize,
    pub not_attended_count: usize,
    pub attended: Vec<AttendanceEntry>,
    pub not_attended: Vec<AttendanceEntry>,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Confirmed => "Confirmed",
            RegistrationStatus::Attended => "Attended",
            RegistrationStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RegistrationStatus::Pending),
            "Confirmed" => Ok(RegistrationStatus::Confirmed),
            "Attended" => Ok(RegistrationStatus::Attended),
            "Cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(ParseEnumError { kind: "registration status", value: other.to_string() }),
        }
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Approved => "Approved",
            PaymentStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Approved" => Ok(PaymentStatus::Approved),
            "Rejected" => Ok(PaymentStatus::Rejected),
            other => Err(ParseEnumError { kind: "payment status", value: other.to_string() }),
        }
    }
}
