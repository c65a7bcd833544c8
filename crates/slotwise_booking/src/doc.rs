// File: crates/slotwise_booking/src/doc.rs
#![cfg(feature = "openapi")]

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::ADMIN_KEY_HEADER;

struct AdminKeyScheme;

impl Modify for AdminKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_KEY_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::availability_handler,
        crate::handlers::available_dates_handler,
        crate::handlers::busy_handler,
        crate::handlers::create_appointment_handler,
        crate::handlers::get_appointment_handler,
        crate::handlers::reschedule_appointment_handler,
        crate::handlers::cancel_appointment_handler,
        crate::handlers::health_handler,
        crate::handlers::get_settings_handler,
        crate::handlers::update_settings_handler,
        crate::handlers::list_working_hours_handler,
        crate::handlers::update_working_hours_handler,
        crate::handlers::list_blocked_dates_handler,
        crate::handlers::block_date_handler,
        crate::handlers::unblock_date_handler,
        crate::handlers::list_appointments_handler,
        crate::handlers::reconcile_handler,
    ),
    components(schemas(
        crate::lifecycle::DayAvailability,
        crate::lifecycle::AvailableDates,
        crate::lifecycle::AppointmentConfirmation,
        crate::lifecycle::GuestDetails,
        crate::lifecycle::ReconciliationReport,
        crate::availability::BusyPeriods,
        crate::availability::BusyPeriod,
        crate::handlers::CreateAppointmentRequest,
        crate::handlers::RescheduleRequest,
        crate::handlers::WorkingHoursUpdate,
        crate::handlers::BlockDateRequest,
        crate::handlers::HealthResponse,
        slotwise_common::models::Appointment,
        slotwise_common::models::AdminSettings,
        slotwise_common::models::WorkingHours,
        slotwise_common::models::BlockedDate,
    )),
    modifiers(&AdminKeyScheme),
    tags(
        (name = "Booking", description = "Public booking and manage-link endpoints"),
        (name = "Admin", description = "Scheduling configuration, requires X-Admin-Key"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct BookingApiDoc;
