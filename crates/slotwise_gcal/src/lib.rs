// --- File: crates/slotwise_gcal/src/lib.rs ---
pub mod auth;
pub mod mail;
pub mod service;

pub use auth::{connect, GoogleClients, HubType};
pub use mail::GmailNotificationService;
pub use service::GoogleCalendarService;
