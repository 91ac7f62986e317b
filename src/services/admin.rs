//! Organizer account administration

use tracing::info;

use crate::config::settings::AdminConfig;
use crate::database::DatabaseService;
use crate::models::{Caller, CascadeSummary, CreateOrganizerRequest, CreateUserRequest, RemovalAction, User, UserRole};
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::helpers::{is_valid_email, organizer_email, slugify};
use crate::utils::logging::log_admin_action;

/// Outcome of removing an organizer account
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RemovalOutcome {
    Disabled { organizer: User },
    Deleted { summary: CascadeSummary },
}

#[derive(Clone)]
pub struct AdminService {
    db: DatabaseService,
    config: AdminConfig,
}

impl AdminService {
    pub fn new(db: DatabaseService, config: AdminConfig) -> Self {
        Self { db, config }
    }

    /// Open an organizer account, deriving a contact email from the name when none is given
    pub async fn create_organizer(&self, caller: &Caller, request: CreateOrganizerRequest) -> Result<User> {
        caller.require_role(UserRole::Admin)?;

        let name = request.organizer_name.trim();
        if slugify(name).is_empty() {
            return Err(CampusEventsError::InvalidInput("Organizer name is required".to_string()));
        }

        let email = match request.email {
            Some(email) => {
                if !is_valid_email(&email) {
                    return Err(CampusEventsError::InvalidInput(format!("Invalid email address: {}", email)));
                }
                email
            }
            None => organizer_email(name, &self.config.organizer_email_domain),
        };
        if self.db.users.find_by_email(&email).await?.is_some() {
            return Err(CampusEventsError::AlreadyExists(format!("A user with email {} already exists", email)));
        }

        let organizer = self
            .db
            .users
            .create(&CreateUserRequest {
                email,
                role: UserRole::Organizer,
                first_name: None,
                last_name: None,
                organizer_name: Some(name.to_string()),
                category: request.category,
                description: request.description,
            })
            .await?;

        log_admin_action(caller.user_id, "create_organizer", Some(&organizer.email), None);
        Ok(organizer)
    }

    pub async fn list_organizers(&self, caller: &Caller) -> Result<Vec<User>> {
        caller.require_role(UserRole::Admin)?;
        self.db.users.list_by_role(UserRole::Organizer).await
    }

    /// Disable an organizer, or delete it together with its events and their registrations
    pub async fn remove_organizer(&self, caller: &Caller, organizer_id: i64, action: RemovalAction) -> Result<RemovalOutcome> {
        caller.require_role(UserRole::Admin)?;

        let organizer = self
            .db
            .users
            .find_by_id(organizer_id)
            .await?
            .filter(|u| u.role == UserRole::Organizer)
            .ok_or_else(|| CampusEventsError::not_found("Organizer", organizer_id))?;

        match action {
            RemovalAction::Disable => {
                let organizer = self
                    .db
                    .users
                    .set_disabled(organizer.id, true)
                    .await?
                    .ok_or_else(|| CampusEventsError::not_found("Organizer", organizer_id))?;
                log_admin_action(caller.user_id, "disable_organizer", Some(&organizer.email), None);
                Ok(RemovalOutcome::Disabled { organizer })
            }
            RemovalAction::Delete => {
                let summary = self.db.users.delete_organizer_cascade(organizer.id).await?;
                let details = format!(
                    "events={} registrations={}",
                    summary.events_deleted, summary.registrations_deleted
                );
                log_admin_action(caller.user_id, "delete_organizer", Some(&organizer.email), Some(&details));
                Ok(RemovalOutcome::Deleted { summary })
            }
        }
    }

    /// Create the configured administrator unless an admin already exists.
    /// Returns the new account, or `None` when nothing was done.
    pub async fn ensure_default_admin(&self) -> Result<Option<User>> {
        let Some(email) = self.config.default_admin_email.clone() else {
            return Ok(None);
        };
        if self.db.users.exists_with_role(UserRole::Admin).await? {
            return Ok(None);
        }

        let admin = self
            .db
            .users
            .create(&CreateUserRequest {
                email,
                role: UserRole::Admin,
                first_name: Some("Admin".to_string()),
                last_name: None,
                organizer_name: None,
                category: None,
                description: None,
            })
            .await?;

        info!(admin_id = admin.id, email = %admin.email, "Default administrator provisioned");
        Ok(Some(admin))
    }
}
