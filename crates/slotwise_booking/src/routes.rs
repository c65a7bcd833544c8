// --- File: crates/slotwise_booking/src/routes.rs ---

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::auth::admin_auth_middleware;
use crate::handlers::{
    availability_handler, available_dates_handler, block_date_handler, busy_handler,
    cancel_appointment_handler, create_appointment_handler, get_appointment_handler,
    get_settings_handler, health_handler, list_appointments_handler, list_blocked_dates_handler,
    list_working_hours_handler, reconcile_handler, reschedule_appointment_handler,
    unblock_date_handler, update_settings_handler, update_working_hours_handler, BookingState,
};

/// Public booking routes, admin routes behind the admin key, and `/health`.
///
/// Paths are relative; the backend nests the router under `/api`.
pub fn routes(state: Arc<BookingState>) -> Router {
    let public = Router::new()
        .route("/booking/availability", get(availability_handler))
        .route("/booking/available-dates", get(available_dates_handler))
        .route("/booking/busy", get(busy_handler))
        .route("/booking/appointments", post(create_appointment_handler))
        .route("/booking/appointments/{token}", get(get_appointment_handler))
        .route(
            "/booking/appointments/{token}/reschedule",
            post(reschedule_appointment_handler),
        )
        .route(
            "/booking/appointments/{token}/cancel",
            post(cancel_appointment_handler),
        )
        .route("/health", get(health_handler));

    let admin = Router::new()
        .route(
            "/admin/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .route("/admin/working-hours", get(list_working_hours_handler))
        .route("/admin/working-hours/{day}", put(update_working_hours_handler))
        .route(
            "/admin/blocked-dates",
            get(list_blocked_dates_handler).post(block_date_handler),
        )
        .route("/admin/blocked-dates/{date}", delete(unblock_date_handler))
        .route("/admin/appointments", get(list_appointments_handler))
        .route("/admin/reconcile", post(reconcile_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    public.merge(admin).with_state(state)
}
