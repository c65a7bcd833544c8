//! Repository for appointments and the assessment back-reference

use crate::error::DbError;
use chrono::{NaiveDate, NaiveTime};
use slotwise_common::models::{Appointment, NewAppointment};
use std::future::Future;

/// Storage operations the appointment lifecycle needs.
///
/// Write methods report a collision with another active booking at the same
/// date and time as [`DbError::Conflict`].
pub trait AppointmentRepository {
    /// Create the `appointments` and `assessment_responses` tables and the
    /// partial unique index on active slots.
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Insert a confirmed appointment with a fresh id and timestamps.
    fn insert(
        &self,
        appointment: NewAppointment,
    ) -> impl Future<Output = Result<Appointment, DbError>> + Send;

    fn find_by_id(&self, id: &str)
        -> impl Future<Output = Result<Option<Appointment>, DbError>> + Send;

    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Appointment>, DbError>> + Send;

    /// The non-cancelled appointment starting exactly at `date`/`time`, ignoring `exclude_id`.
    fn find_active_at(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        exclude_id: Option<&str>,
    ) -> impl Future<Output = Result<Option<Appointment>, DbError>> + Send;

    /// Non-cancelled appointments on one date, ordered by start time.
    fn list_active_on(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    /// Appointments in `[from, to]`, ordered by date and time.
    fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> impl Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    /// Move an active appointment. Returns `false` when no active row matched.
    fn update_schedule(
        &self,
        id: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn update_meeting_link(
        &self,
        id: &str,
        meeting_join_url: &str,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Flip an active appointment to `cancelled`.
    ///
    /// Returns `false` when the row was already cancelled (or does not exist),
    /// so of two racing cancels only one sees `true`.
    fn mark_cancelled(&self, id: &str) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Calendar event ids referenced by non-cancelled appointments.
    fn active_meeting_ids(&self) -> impl Future<Output = Result<Vec<String>, DbError>> + Send;

    /// Point an assessment response at its appointment. Returns `false` when
    /// the assessment does not exist.
    fn link_assessment(
        &self,
        assessment_id: &str,
        appointment_id: &str,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;
}
