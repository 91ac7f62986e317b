//! Request fixtures

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use CampusEvents::models::{CreateEventRequest, EventKind, FieldType, FormField, FormResponse, RegisterRequest};

pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

/// Normal event a week out, registrations open until the day before
pub fn workshop(name: &str) -> CreateEventRequest {
    CreateEventRequest {
        name: name.to_string(),
        description: Some(format!("{} for all years", name)),
        kind: EventKind::Normal,
        eligibility: Some("All students".to_string()),
        tags: vec!["workshop".to_string()],
        registration_deadline: Some(days_from_now(6)),
        event_start: Some(days_from_now(7)),
        event_end: Some(days_from_now(7) + Duration::hours(3)),
        registration_limit: None,
        registration_fee: Some(100),
        sizes: Vec::new(),
        colors: Vec::new(),
        variants: Vec::new(),
        quantity: None,
        purchase_limit: None,
        form: Vec::new(),
    }
}

pub fn workshop_with_limit(name: &str, limit: i32) -> CreateEventRequest {
    CreateEventRequest { registration_limit: Some(limit), ..workshop(name) }
}

/// Club merchandise sale with the given stock and per-order limit
pub fn merchandise(name: &str, quantity: i32, purchase_limit: i32) -> CreateEventRequest {
    CreateEventRequest {
        name: name.to_string(),
        description: Some("Official club merchandise".to_string()),
        kind: EventKind::Merchandise,
        eligibility: None,
        tags: vec!["merch".to_string()],
        registration_deadline: Some(days_from_now(10)),
        event_start: None,
        event_end: None,
        registration_limit: None,
        registration_fee: Some(499),
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
        colors: vec!["Black".to_string(), "White".to_string()],
        variants: Vec::new(),
        quantity: Some(quantity),
        purchase_limit: Some(purchase_limit),
        form: Vec::new(),
    }
}

pub fn form_field(label: &str, field_type: FieldType, required: bool, options: &[&str], order: i32) -> FormField {
    FormField {
        label: label.to_string(),
        field_type,
        options: options.iter().map(|o| o.to_string()).collect(),
        required,
        order: Some(order),
    }
}

pub fn answer(label: &str, value: serde_json::Value) -> FormResponse {
    FormResponse { label: label.to_string(), value }
}

pub fn register_for(event_id: i64) -> RegisterRequest {
    RegisterRequest { event_id, ..Default::default() }
}

pub fn order(event_id: i64, quantity: i32) -> RegisterRequest {
    RegisterRequest {
        event_id,
        size: Some("M".to_string()),
        color: Some("Black".to_string()),
        quantity: Some(quantity),
        payment_proof: Some("upi-ref-20931".to_string()),
        ..Default::default()
    }
}

pub fn year_answer(year: &str) -> FormResponse {
    answer("Year of study", json!(year))
}
