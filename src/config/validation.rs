//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{CampusEventsError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_ticket_config(&settings.tickets)?;
    validate_email_config(&settings.email)?;
    validate_admin_config(&settings.admin)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(CampusEventsError::Config(
            "Server host is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(CampusEventsError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(CampusEventsError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(CampusEventsError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate ticket identifier configuration
fn validate_ticket_config(config: &super::TicketConfig) -> Result<()> {
    if config.prefix.is_empty() || !config.prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CampusEventsError::Config(
            "Ticket prefix must be non-empty and alphanumeric".to_string()
        ));
    }

    if config.code_length < 6 {
        return Err(CampusEventsError::Config(
            "Ticket code length must be at least 6".to_string()
        ));
    }

    Ok(())
}

/// Validate email configuration
fn validate_email_config(config: &super::EmailConfig) -> Result<()> {
    if config.enabled && !crate::utils::helpers::is_valid_email(&config.from_address) {
        return Err(CampusEventsError::Config(
            format!("Invalid sender address: {}", config.from_address)
        ));
    }

    Ok(())
}

/// Validate administration configuration
fn validate_admin_config(config: &super::AdminConfig) -> Result<()> {
    if let Some(ref email) = config.default_admin_email {
        if !crate::utils::helpers::is_valid_email(email) {
            return Err(CampusEventsError::Config(
                format!("Invalid default admin email: {}", email)
            ));
        }
    }

    if config.organizer_email_domain.is_empty() {
        return Err(CampusEventsError::Config(
            "Organizer email domain is required".to_string()
        ));
    }

    Ok(())
}

/// Validate rate limit configuration
fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.enabled && config.requests_per_minute == 0 {
        return Err(CampusEventsError::Config(
            "Requests per minute must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(CampusEventsError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(CampusEventsError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
