//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    });
    re.is_match(email)
}

/// Turn an organizer name into a lowercase, dash-separated slug
pub fn slugify(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| {
        Regex::new(r"[^a-z0-9]+").expect("valid slug regex")
    });
    let lowered = name.to_lowercase();
    re.replace_all(&lowered, "-").trim_matches('-').to_string()
}

/// Build a contact address for an organizer from its display name
pub fn organizer_email(name: &str, domain: &str) -> String {
    format!("{}@{}", slugify(name), domain)
}

/// Join first and last name, tolerating missing parts
pub fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
