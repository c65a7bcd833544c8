//! Row decoding shared by the SQL repositories.

use crate::error::DbError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use slotwise_common::models::{
    parse_date, parse_time, AdminSettings, Appointment, AppointmentStatus, BlockedDate,
    WorkingHours,
};
use sqlx::any::AnyRow;
use sqlx::Row;

// The Any driver cannot decode a NULL into Option<String>, so nullable text
// columns come back as '' and are mapped to None by `optional_text`.
pub(crate) const APPOINTMENT_COLUMNS: &str = "id, appointment_date, appointment_time, \
     duration_minutes, guest_name, guest_email, \
     COALESCE(guest_phone, '') AS guest_phone, COALESCE(notes, '') AS notes, \
     status, cancel_token, \
     COALESCE(meeting_id, '') AS meeting_id, \
     COALESCE(meeting_join_url, '') AS meeting_join_url, \
     COALESCE(assessment_id, '') AS assessment_id, \
     COALESCE(created_at, '') AS created_at, COALESCE(updated_at, '') AS updated_at";

pub(crate) const BLOCKED_DATE_COLUMNS: &str = "blocked_date, COALESCE(reason, '') AS reason";

pub(crate) fn now_text() -> String {
    Utc::now().to_rfc3339()
}

fn date_column(row: &AnyRow, column: &str) -> Result<NaiveDate, DbError> {
    let raw: String = row.try_get(column)?;
    parse_date(&raw).ok_or_else(|| DbError::DecodeError(format!("{column}: '{raw}' is not a date")))
}

fn time_column(row: &AnyRow, column: &str) -> Result<NaiveTime, DbError> {
    let raw: String = row.try_get(column)?;
    parse_time(&raw).ok_or_else(|| DbError::DecodeError(format!("{column}: '{raw}' is not a time")))
}

/// A coalesced nullable text column; empty means NULL.
pub(crate) fn optional_text(row: &AnyRow, column: &str) -> Option<String> {
    row.try_get::<String, _>(column)
        .ok()
        .filter(|value| !value.is_empty())
}

fn timestamp_column(row: &AnyRow, column: &str) -> Option<DateTime<Utc>> {
    optional_text(row, column)
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn appointment_from_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let status: String = row.try_get("status")?;
    Ok(Appointment {
        id: row.try_get("id")?,
        appointment_date: date_column(row, "appointment_date")?,
        appointment_time: time_column(row, "appointment_time")?,
        duration_minutes: row.try_get("duration_minutes")?,
        guest_name: row.try_get("guest_name")?,
        guest_email: row.try_get("guest_email")?,
        guest_phone: optional_text(row, "guest_phone"),
        notes: optional_text(row, "notes"),
        status: AppointmentStatus::from(status.as_str()),
        cancel_token: row.try_get("cancel_token")?,
        meeting_id: optional_text(row, "meeting_id"),
        meeting_join_url: optional_text(row, "meeting_join_url"),
        assessment_id: optional_text(row, "assessment_id"),
        created_at: timestamp_column(row, "created_at"),
        updated_at: timestamp_column(row, "updated_at"),
    })
}

pub(crate) fn working_hours_from_row(row: &AnyRow) -> Result<WorkingHours, DbError> {
    let is_available: i64 = row.try_get("is_available")?;
    Ok(WorkingHours {
        day_of_week: row.try_get("day_of_week")?,
        start_time: time_column(row, "start_time")?,
        end_time: time_column(row, "end_time")?,
        is_available: is_available != 0,
    })
}

pub(crate) fn blocked_date_from_row(row: &AnyRow) -> Result<BlockedDate, DbError> {
    Ok(BlockedDate {
        blocked_date: date_column(row, "blocked_date")?,
        reason: optional_text(row, "reason"),
    })
}

pub(crate) fn settings_from_row(row: &AnyRow) -> Result<AdminSettings, DbError> {
    Ok(AdminSettings {
        appointment_duration_minutes: row.try_get("appointment_duration_minutes")?,
        buffer_minutes: row.try_get("buffer_minutes")?,
        advance_booking_days: row.try_get("advance_booking_days")?,
        default_monthly_capacity: row.try_get("default_monthly_capacity")?,
        timezone: row.try_get("timezone")?,
    })
}
