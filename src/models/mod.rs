//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod registration;

// Re-export commonly used models
pub use user::{User, UserRole, Caller, CreateUserRequest, CreateOrganizerRequest, RemovalAction, CascadeSummary};
pub use event::{Event, EventKind, EventStatus, FieldType, FormField, CreateEventRequest, UpdateEventRequest, EventDetails, PublishedEventFilter, ParseEnumError};
pub use registration::{
    Registration, RegistrationStatus, PaymentStatus, FormResponse, RegisterRequest, NewRegistration,
    InsertOutcome, ProofOutcome, PaymentDecision, Admission, EventSummary, RegistrationWithEvent, ParticipantInfo,
    ParticipantEntry, ScanReceipt, AttendanceEntry, AttendanceDashboard,
};
