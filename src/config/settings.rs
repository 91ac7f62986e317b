//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tickets: TicketConfig,
    pub email: EmailConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
///
/// A `memory://` URL selects the in-process store instead of PostgreSQL.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

/// Ticket identifier configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketConfig {
    pub prefix: String,
    pub code_length: usize,
}

/// Ticket email delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub enabled: bool,
    pub from_address: String,
}

/// Administration configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Email of the administrator provisioned at startup when no admin exists
    pub default_admin_email: Option<String>,
    /// Domain used for generated organizer contact addresses
    pub organizer_email_domain: String,
}

/// Per-caller rate limiting for mutating API routes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_minute: u32,
    pub burst: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from defaults, an optional `config` file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(config::File::with_name("config").required(false))
    }

    /// Load settings from an explicit file path, still honoring environment overrides
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        Self::load(config::File::with_name(path).required(true))
    }

    fn load<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(config::Environment::with_prefix("CAMPUS_EVENTS").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::CampusEventsError> {
        super::validation::validate_settings(self)
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/campus_events".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                run_migrations: true,
            },
            tickets: TicketConfig {
                prefix: "TKT".to_string(),
                code_length: 6,
            },
            email: EmailConfig {
                enabled: true,
                from_address: "events@campus.local".to_string(),
            },
            admin: AdminConfig {
                default_admin_email: None,
                organizer_email_domain: "clubs.campus.local".to_string(),
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                requests_per_minute: 60,
                burst: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
                file_path: None,
            },
        }
    }
}
