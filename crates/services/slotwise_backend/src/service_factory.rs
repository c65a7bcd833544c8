// --- File: crates/services/slotwise_backend/src/service_factory.rs ---
//! Builds the external services the booking flow talks to.
//!
//! Google Calendar and Gmail share one delegated service account. When the
//! calendar is switched off or its credentials are incomplete, the server
//! still starts with an unconfigured gateway so availability keeps working.

use slotwise_common::models::AdminSettings;
use slotwise_common::services::{CalendarGateway, NotificationService};
use slotwise_common::{is_email_enabled, is_gcal_enabled};
use slotwise_config::{AppConfig, BookingConfig};
use slotwise_gcal::{GmailNotificationService, GoogleCalendarService};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ExternalServices {
    pub gateway: Arc<dyn CalendarGateway>,
    pub notifier: Option<Arc<dyn NotificationService>>,
}

pub async fn build_services(config: &AppConfig) -> ExternalServices {
    let gcal = match config.gcal.as_ref() {
        Some(gcal) if is_gcal_enabled(config) => gcal,
        _ => {
            info!("Google Calendar disabled by configuration");
            return ExternalServices {
                gateway: Arc::new(GoogleCalendarService::unconfigured(
                    "use_gcal is off or the [gcal] section is missing",
                )),
                notifier: None,
            };
        }
    };

    let (gateway, token_source) = GoogleCalendarService::from_config(gcal).await;
    if gateway.is_configured() {
        info!("Google Calendar gateway ready");
    }

    let sender = gcal
        .sender_email
        .clone()
        .or_else(|| gcal.impersonate.clone())
        .filter(|s| !s.trim().is_empty());
    let notifier: Option<Arc<dyn NotificationService>> = match (is_email_enabled(config), token_source, sender) {
        (false, _, _) => None,
        (true, Some(token_source), Some(sender)) => {
            info!("Guest emails are sent as {}", sender);
            Some(Arc::new(GmailNotificationService::new(token_source, sender)))
        }
        (true, None, _) => {
            warn!("use_email is on but Google credentials are unavailable, emails disabled");
            None
        }
        (true, Some(_), None) => {
            warn!("use_email is on but neither sender_email nor impersonate is set, emails disabled");
            None
        }
    };

    ExternalServices {
        gateway: Arc::new(gateway),
        notifier,
    }
}

/// Settings row written on the very first start.
pub fn default_settings(booking: &BookingConfig) -> AdminSettings {
    AdminSettings {
        appointment_duration_minutes: booking.default_duration_minutes,
        buffer_minutes: booking.default_buffer_minutes,
        advance_booking_days: booking.default_advance_booking_days,
        default_monthly_capacity: booking.default_monthly_capacity,
        timezone: booking.default_timezone.clone(),
    }
}
