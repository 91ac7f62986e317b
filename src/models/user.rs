//! User model
//!
//! Users are managed by the external account system; this crate only needs
//! their role, contact details and whether an organizer account is disabled.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::event::ParseEnumError;
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::helpers::full_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Participant,
    Organizer,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organizer_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        match self.role {
            UserRole::Organizer => self.organizer_name.clone().unwrap_or_else(|| self.email.clone()),
            _ => full_name(self.first_name.as_deref(), self.last_name.as_deref()),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;

        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            role: role.parse().map_err(|e: ParseEnumError| sqlx::Error::Decode(Box::new(e)))?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            organizer_name: row.try_get("organizer_name")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            disabled: row.try_get("disabled")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organizer_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Admin request to open an organizer (club) account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrganizerRequest {
    pub organizer_name: String,
    pub email: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// What happens to an organizer account on removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalAction {
    #[default]
    Disable,
    Delete,
}

/// Rows removed by a cascading organizer deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeSummary {
    pub events_deleted: u64,
    pub registrations_deleted: u64,
}

/// Authenticated identity of the caller, trusted as given by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: i64,
    pub role: UserRole,
}

impl Caller {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn participant(user_id: i64) -> Self {
        Self::new(user_id, UserRole::Participant)
    }

    pub fn organizer(user_id: i64) -> Self {
        Self::new(user_id, UserRole::Organizer)
    }

    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    /// Fail with `Forbidden` unless the caller has the given role
    pub fn require_role(&self, role: UserRole) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(CampusEventsError::Forbidden(format!("{} role required", role)))
        }
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Participant => "Participant",
            UserRole::Organizer => "Organizer",
            UserRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Participant" => Ok(UserRole::Participant),
            "Organizer" => Ok(UserRole::Organizer),
            "Admin" => Ok(UserRole::Admin),
            other => Err(ParseEnumError { kind: "user role", value: other.to_string() }),
        }
    }
}
