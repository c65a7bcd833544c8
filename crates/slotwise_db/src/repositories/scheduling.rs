//! Repository for settings, working hours and blocked dates

use crate::error::DbError;
use chrono::NaiveDate;
use slotwise_common::models::{AdminSettings, BlockedDate, WorkingHours};
use std::future::Future;

/// Storage for the data the availability calculator reads.
pub trait SchedulingRepository {
    /// Create the tables and seed the settings row and default working
    /// hours (Monday to Friday, 09:00-17:00). Existing rows are kept.
    fn init_schema(
        &self,
        defaults: &AdminSettings,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn get_settings(&self) -> impl Future<Output = Result<AdminSettings, DbError>> + Send;

    fn update_settings(
        &self,
        settings: &AdminSettings,
    ) -> impl Future<Output = Result<AdminSettings, DbError>> + Send;

    /// All configured weekdays, ordered by `day_of_week`.
    fn list_working_hours(&self) -> impl Future<Output = Result<Vec<WorkingHours>, DbError>> + Send;

    fn upsert_working_hours(
        &self,
        hours: &WorkingHours,
    ) -> impl Future<Output = Result<WorkingHours, DbError>> + Send;

    fn list_blocked_dates(&self) -> impl Future<Output = Result<Vec<BlockedDate>, DbError>> + Send;

    /// Block a date. Blocking an already blocked date replaces its reason.
    fn add_blocked_date(
        &self,
        blocked: &BlockedDate,
    ) -> impl Future<Output = Result<BlockedDate, DbError>> + Send;

    fn remove_blocked_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;
}
