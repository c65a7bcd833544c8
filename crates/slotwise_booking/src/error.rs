// --- File: crates/slotwise_booking/src/error.rs ---
//! Errors the booking flow reports to its callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use slotwise_common::error_response;
use slotwise_common::services::GatewayError;
use slotwise_db::DbError;
use thiserror::Error;
use tracing::error;

use crate::availability::SettingsError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("The requested slot is no longer available")]
    SlotConflict,

    #[error("No appointment matches this link")]
    NotFound,

    #[error("The appointment has already been cancelled")]
    AlreadyCancelled,

    #[error("The appointment time has already passed")]
    PastAppointment,

    #[error("Calendar authentication failed: {0}")]
    GatewayAuthFailure(String),

    #[error("Calendar update failed: {0}")]
    GatewayWriteFailure(String),

    #[error("Calendar lookup failed: {0}")]
    GatewayReadFailure(String),

    #[error("Calendar integration is not configured: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl BookingError {
    /// Stable tag the UI switches on.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::SlotConflict => "slot_conflict",
            BookingError::NotFound => "not_found",
            BookingError::AlreadyCancelled => "already_cancelled",
            BookingError::PastAppointment => "past_appointment",
            BookingError::GatewayAuthFailure(_) => "gateway_auth_failure",
            BookingError::GatewayWriteFailure(_) => "gateway_write_failure",
            BookingError::GatewayReadFailure(_) => "gateway_read_failure",
            BookingError::ConfigurationMissing(_) => "configuration_missing",
            BookingError::Validation(_) => "validation",
            BookingError::Storage(_) => "storage",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::SlotConflict => StatusCode::CONFLICT,
            BookingError::NotFound => StatusCode::NOT_FOUND,
            BookingError::AlreadyCancelled | BookingError::PastAppointment => StatusCode::GONE,
            BookingError::GatewayAuthFailure(_)
            | BookingError::GatewayWriteFailure(_)
            | BookingError::GatewayReadFailure(_) => StatusCode::BAD_GATEWAY,
            BookingError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client gets to read. Provider and storage details stay in the log.
    fn public_message(&self) -> String {
        match self {
            BookingError::GatewayAuthFailure(_)
            | BookingError::GatewayWriteFailure(_)
            | BookingError::GatewayReadFailure(_) => {
                "The calendar service is temporarily unavailable, please try again".to_string()
            }
            BookingError::ConfigurationMissing(_) => {
                "Online booking is not available right now".to_string()
            }
            BookingError::Storage(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<GatewayError> for BookingError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured(msg) => BookingError::ConfigurationMissing(msg),
            GatewayError::Auth(msg) => BookingError::GatewayAuthFailure(msg),
            GatewayError::Write(msg) => BookingError::GatewayWriteFailure(msg),
            GatewayError::Read(msg) => BookingError::GatewayReadFailure(msg),
            missing @ GatewayError::MissingConferenceLink { .. } => {
                BookingError::GatewayWriteFailure(missing.to_string())
            }
        }
    }
}

impl From<DbError> for BookingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(_) => BookingError::SlotConflict,
            other => BookingError::Storage(other.to_string()),
        }
    }
}

impl From<SettingsError> for BookingError {
    fn from(err: SettingsError) -> Self {
        BookingError::Validation(err.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Booking request failed: {}", self);
        }
        error_response(status, self.kind(), self.public_message())
    }
}
