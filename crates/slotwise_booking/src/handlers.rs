// File: crates/slotwise_booking/src/handlers.rs
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slotwise_common::models::{
    parse_date, parse_time, AdminSettings, Appointment, BlockedDate, WorkingHours,
};
use std::sync::Arc;

use crate::availability::BusyPeriods;
use crate::error::BookingError;
use crate::lifecycle::{
    AppointmentConfirmation, AvailableDates, BookingRequest, BookingService, DayAvailability,
    GuestDetails, ReconciliationReport,
};

/// Shared state for the booking routes.
#[derive(Clone)]
pub struct BookingState {
    pub service: Arc<BookingService>,
    /// `None` disables the admin routes.
    pub admin_key: Option<String>,
}

fn required_date(field: &str, value: Option<&str>) -> Result<NaiveDate, BookingError> {
    let raw = value.ok_or_else(|| BookingError::Validation(format!("'{field}' is required")))?;
    parse_date(raw).ok_or_else(|| {
        BookingError::Validation(format!("'{field}' must be a date in YYYY-MM-DD format"))
    })
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, BookingError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| BookingError::Validation(rejection.body_text()))
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// YYYY-MM-DD
    pub date: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// YYYY-MM-DD, inclusive
    pub from: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub to: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct AppointmentsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub include_cancelled: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub time: String,
    #[serde(flatten)]
    pub guest: GuestDetails,
    #[serde(default)]
    pub assessment_id: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub date: String,
    pub time: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct WorkingHoursUpdate {
    /// HH:MM
    pub start_time: String,
    /// HH:MM
    pub end_time: String,
    pub is_available: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct BlockDateRequest {
    pub date: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
}

// --- Public booking routes ---

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/availability",
    params(DateQuery),
    responses(
        (status = 200, description = "Open slots for the date", body = DayAvailability),
        (status = 400, description = "Missing or malformed date"),
    ),
    tag = "Booking"
))]
pub async fn availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DayAvailability>, BookingError> {
    let date = required_date("date", query.date.as_deref())?;
    Ok(Json(state.service.available_slots(date).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/available-dates",
    params(RangeQuery),
    responses(
        (status = 200, description = "Bookable dates in the range", body = AvailableDates),
        (status = 400, description = "Missing, malformed or oversized range"),
    ),
    tag = "Booking"
))]
pub async fn available_dates_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<AvailableDates>, BookingError> {
    let from = required_date("from", query.from.as_deref())?;
    let to = required_date("to", query.to.as_deref())?;
    Ok(Json(state.service.available_dates(from, to).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/busy",
    params(DateQuery),
    responses(
        (status = 200, description = "Busy periods from the external calendar", body = BusyPeriods),
        (status = 400, description = "Missing or malformed date"),
    ),
    tag = "Booking"
))]
pub async fn busy_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<BusyPeriods>, BookingError> {
    let date = required_date("date", query.date.as_deref())?;
    Ok(Json(state.service.fetch_busy_periods(date).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentConfirmation),
        (status = 400, description = "Invalid guest details or slot"),
        (status = 409, description = "Slot already taken"),
        (status = 410, description = "Slot start has passed"),
        (status = 502, description = "Calendar provider failed"),
        (status = 503, description = "Calendar not configured"),
    ),
    tag = "Booking"
))]
pub async fn create_appointment_handler(
    State(state): State<Arc<BookingState>>,
    body: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AppointmentConfirmation>), BookingError> {
    let request = json_body(body)?;
    let date = required_date("date", Some(&request.date))?;
    let time = parse_time(&request.time)
        .ok_or_else(|| BookingError::Validation("'time' must be in HH:MM format".to_string()))?;

    let confirmation = state
        .service
        .create_appointment(BookingRequest {
            date,
            time,
            guest: request.guest,
            assessment_id: request.assessment_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/appointments/{token}",
    params(("token" = String, Path, description = "Manage-link token")),
    responses(
        (status = 200, description = "The appointment", body = Appointment),
        (status = 404, description = "Unknown token"),
    ),
    tag = "Booking"
))]
pub async fn get_appointment_handler(
    State(state): State<Arc<BookingState>>,
    Path(token): Path<String>,
) -> Result<Json<Appointment>, BookingError> {
    Ok(Json(state.service.get_appointment_by_token(&token).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/appointments/{token}/reschedule",
    params(("token" = String, Path, description = "Manage-link token")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Appointment moved", body = Appointment),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "New slot already taken"),
        (status = 410, description = "Appointment cancelled or already started"),
    ),
    tag = "Booking"
))]
pub async fn reschedule_appointment_handler(
    State(state): State<Arc<BookingState>>,
    Path(token): Path<String>,
    body: Result<Json<RescheduleRequest>, JsonRejection>,
) -> Result<Json<Appointment>, BookingError> {
    let request = json_body(body)?;
    let date = required_date("date", Some(&request.date))?;
    let time = parse_time(&request.time)
        .ok_or_else(|| BookingError::Validation("'time' must be in HH:MM format".to_string()))?;
    Ok(Json(
        state.service.reschedule_appointment(&token, date, time).await?,
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/appointments/{token}/cancel",
    params(("token" = String, Path, description = "Manage-link token")),
    responses(
        (status = 200, description = "Appointment cancelled", body = Appointment),
        (status = 404, description = "Unknown token"),
        (status = 410, description = "Appointment cancelled or already started"),
    ),
    tag = "Booking"
))]
pub async fn cancel_appointment_handler(
    State(state): State<Arc<BookingState>>,
    Path(token): Path<String>,
) -> Result<Json<Appointment>, BookingError> {
    Ok(Json(state.service.cancel_appointment(&token).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse),
    ),
    tag = "Health"
))]
pub async fn health_handler(State(state): State<Arc<BookingState>>) -> Response {
    let database = state.service.is_healthy().await;
    let (status_code, status) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    let body = HealthResponse {
        status: status.to_string(),
        database,
    };
    (status_code, Json(body)).into_response()
}

// --- Admin routes ---

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/settings",
    responses((status = 200, description = "Scheduling settings", body = AdminSettings)),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn get_settings_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<AdminSettings>, BookingError> {
    Ok(Json(state.service.settings().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/admin/settings",
    request_body = AdminSettings,
    responses(
        (status = 200, description = "Stored settings", body = AdminSettings),
        (status = 400, description = "Invalid settings"),
    ),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn update_settings_handler(
    State(state): State<Arc<BookingState>>,
    body: Result<Json<AdminSettings>, JsonRejection>,
) -> Result<Json<AdminSettings>, BookingError> {
    let settings = json_body(body)?;
    Ok(Json(state.service.update_settings(settings).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/working-hours",
    responses((status = 200, description = "Weekly opening hours", body = [WorkingHours])),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn list_working_hours_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<Vec<WorkingHours>>, BookingError> {
    Ok(Json(state.service.working_hours().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/admin/working-hours/{day}",
    params(("day" = i64, Path, description = "0 = Sunday … 6 = Saturday")),
    request_body = WorkingHoursUpdate,
    responses(
        (status = 200, description = "Stored hours", body = WorkingHours),
        (status = 400, description = "Invalid day or window"),
    ),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn update_working_hours_handler(
    State(state): State<Arc<BookingState>>,
    Path(day): Path<i64>,
    body: Result<Json<WorkingHoursUpdate>, JsonRejection>,
) -> Result<Json<WorkingHours>, BookingError> {
    let update = json_body(body)?;
    let parse = |field: &str, value: &str| {
        parse_time(value)
            .ok_or_else(|| BookingError::Validation(format!("'{field}' must be in HH:MM format")))
    };
    let hours = WorkingHours {
        day_of_week: day,
        start_time: parse("start_time", &update.start_time)?,
        end_time: parse("end_time", &update.end_time)?,
        is_available: update.is_available,
    };
    Ok(Json(state.service.update_working_hours(hours).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/blocked-dates",
    responses((status = 200, description = "Blocked dates", body = [BlockedDate])),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn list_blocked_dates_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<Vec<BlockedDate>>, BookingError> {
    Ok(Json(state.service.blocked_dates().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/blocked-dates",
    request_body = BlockDateRequest,
    responses(
        (status = 201, description = "Date blocked", body = BlockedDate),
        (status = 400, description = "Malformed date"),
    ),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn block_date_handler(
    State(state): State<Arc<BookingState>>,
    body: Result<Json<BlockDateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BlockedDate>), BookingError> {
    let request = json_body(body)?;
    let blocked_date = required_date("date", Some(&request.date))?;
    let stored = state
        .service
        .block_date(BlockedDate {
            blocked_date,
            reason: request.reason,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/blocked-dates/{date}",
    params(("date" = String, Path, description = "YYYY-MM-DD")),
    responses(
        (status = 204, description = "Date unblocked"),
        (status = 404, description = "Date was not blocked"),
    ),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn unblock_date_handler(
    State(state): State<Arc<BookingState>>,
    Path(date): Path<String>,
) -> Result<StatusCode, BookingError> {
    let date = required_date("date", Some(&date))?;
    state.service.unblock_date(date).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/appointments",
    params(AppointmentsQuery),
    responses((status = 200, description = "Appointments in the range", body = [Appointment])),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn list_appointments_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, BookingError> {
    let from = required_date("from", query.from.as_deref())?;
    let to = required_date("to", query.to.as_deref())?;
    Ok(Json(
        state
            .service
            .list_appointments(from, to, query.include_cancelled)
            .await?,
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/reconcile",
    params(RangeQuery),
    responses(
        (status = 200, description = "Sweep result", body = ReconciliationReport),
        (status = 502, description = "Calendar provider failed"),
        (status = 503, description = "Calendar not configured"),
    ),
    security(("admin_key" = [])),
    tag = "Admin"
))]
pub async fn reconcile_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ReconciliationReport>, BookingError> {
    let from = required_date("from", query.from.as_deref())?;
    let to = required_date("to", query.to.as_deref())?;
    Ok(Json(
        state.service.reconcile_orphaned_events(from, to).await?,
    ))
}
