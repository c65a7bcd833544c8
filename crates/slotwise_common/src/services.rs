//! Service abstractions for external services.
//!
//! The booking logic only talks to the calendar provider and the mail provider
//! through these traits, so it can be exercised against in-memory fakes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A busy interval reported by the calendar provider (half-open, UTC).
pub type BusyInterval = (DateTime<Utc>, DateTime<Utc>);

/// Errors surfaced by a calendar or mail gateway.
///
/// The variants are what callers branch on: reads degrade on `NotConfigured`,
/// writes turn it into a hard configuration error.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Credentials or target calendar are not configured on this deployment.
    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    /// A short-lived access token could not be obtained.
    #[error("Gateway authentication failed: {0}")]
    Auth(String),

    /// The provider rejected or failed a write.
    #[error("Gateway write failed: {0}")]
    Write(String),

    /// The provider rejected or failed a read.
    #[error("Gateway read failed: {0}")]
    Read(String),

    /// The event was created but the provider returned no conferencing link.
    #[error("Calendar event {event_id} has no conference link")]
    MissingConferenceLink { event_id: String },
}

/// A trait for calendar gateway operations.
///
/// Implementations are bound to one target calendar, chosen at construction.
pub trait CalendarGateway: Send + Sync {
    /// `false` when credentials or the calendar id are missing.
    fn is_configured(&self) -> bool;

    /// Busy intervals overlapping `[start_time, end_time)`, sorted by start.
    fn get_busy_times(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, GatewayError>;

    /// Creates an event with a generated video-conference link.
    fn create_event(&self, event: NewCalendarEvent) -> BoxFuture<'_, CreatedEvent, GatewayError>;

    /// Moves an existing event to a new window, keeping its id.
    fn patch_event_window(
        &self,
        event_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        time_zone: &str,
    ) -> BoxFuture<'_, PatchedEvent, GatewayError>;

    /// Deletes an event. An event that is already gone counts as deleted.
    fn delete_event(&self, event_id: &str) -> BoxFuture<'_, (), GatewayError>;

    /// Events created by this system (and only those) within the window.
    fn list_owned_events(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<OwnedEvent>, GatewayError>;
}

/// A trait for notification service operations.
pub trait NotificationService: Send + Sync {
    /// Send a plain text email.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> BoxFuture<'_, NotificationResult, GatewayError>;
}

/// Data for a calendar event about to be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// IANA zone the event is displayed in, e.g. "Europe/Zurich".
    pub time_zone: String,
    pub summary: String,
    pub description: Option<String>,
    pub attendee_email: String,
    pub attendee_name: Option<String>,
}

/// Result of a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub event_id: String,
    pub meeting_join_url: String,
}

/// Result of a successful patch. The provider may or may not hand back a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchedEvent {
    pub event_id: String,
    pub meeting_join_url: Option<String>,
}

/// An event in the calendar that carries this system's ownership marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedEvent {
    pub event_id: String,
    pub start_time: Option<DateTime<Utc>>,
    /// When the provider recorded the event; used to leave in-flight bookings alone.
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub id: String,
    pub status: String,
}
