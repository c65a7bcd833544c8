// --- File: crates/slotwise_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/slotwise.db, or SLOTWISE__DATABASE__URL
}

// --- Google Calendar / Gmail Config ---
// The service account key itself never lives in the config file, only its path.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    pub key_path: Option<String>,
    pub calendar_id: Option<String>,
    /// Mailbox the service account acts as (domain-wide delegation).
    pub impersonate: Option<String>,
    /// From address for notifications, defaults to `impersonate`.
    pub sender_email: Option<String>,
    /// Title used for created calendar events.
    pub event_summary: Option<String>,
}

// --- Booking defaults ---
// Used to seed the admin_settings row the first time the schema is created.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// Base URL of the public site, used for manage links in emails.
    pub public_base_url: String,
    #[serde(default = "default_duration")]
    pub default_duration_minutes: i64,
    #[serde(default)]
    pub default_buffer_minutes: i64,
    #[serde(default = "default_advance_days")]
    pub default_advance_booking_days: i64,
    #[serde(default = "default_capacity")]
    pub default_monthly_capacity: i64,
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

fn default_duration() -> i64 {
    30
}

fn default_advance_days() -> i64 {
    30
}

fn default_capacity() -> i64 {
    20
}

fn default_timezone() -> String {
    "Europe/Zurich".to_string()
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080".to_string(),
            default_duration_minutes: default_duration(),
            default_buffer_minutes: 0,
            default_advance_booking_days: default_advance_days(),
            default_monthly_capacity: default_capacity(),
            default_timezone: default_timezone(),
        }
    }
}

// --- Admin Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AdminConfig {
    pub api_key: Option<String>, // usually "secret_from_env" -> ADMIN_API_KEY
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// When set, logs are additionally written to a daily rolling file here.
    pub directory: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_email: bool,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
