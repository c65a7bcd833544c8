// --- File: crates/slotwise_booking/src/availability.rs ---
//! Slot arithmetic.
//!
//! Everything here is synchronous and works on an explicit
//! [`SchedulingContext`] plus the current instant, so the same inputs always
//! give the same slots. Local dates and times are in the scheduling timezone;
//! busy intervals from the calendar provider are UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use slotwise_common::models::{day_of_week, AdminSettings, Appointment, BlockedDate, WorkingHours};
use slotwise_common::services::BusyInterval;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Longest appointment the calculator accepts: one day.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;
/// Upper bound for `advance_booking_days`.
pub const MAX_ADVANCE_DAYS: i64 = 3650;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("appointment_duration_minutes must be between 1 and 1440")]
    Duration,
    #[error("buffer_minutes must not be negative")]
    Buffer,
    #[error("advance_booking_days must be between 0 and 3650")]
    AdvanceDays,
    #[error("default_monthly_capacity must not be negative")]
    Capacity,
    #[error("unknown timezone '{0}'")]
    Timezone(String),
    #[error("day_of_week must be between 0 (Sunday) and 6 (Saturday)")]
    DayOfWeek,
    #[error("start_time must be before end_time")]
    WorkingWindow,
}

/// Check an admin-supplied settings row.
pub fn validate_settings(settings: &AdminSettings) -> Result<Tz, SettingsError> {
    if !(1..=MAX_DURATION_MINUTES).contains(&settings.appointment_duration_minutes) {
        return Err(SettingsError::Duration);
    }
    if settings.buffer_minutes < 0 {
        return Err(SettingsError::Buffer);
    }
    if !(0..=MAX_ADVANCE_DAYS).contains(&settings.advance_booking_days) {
        return Err(SettingsError::AdvanceDays);
    }
    if settings.default_monthly_capacity < 0 {
        return Err(SettingsError::Capacity);
    }
    parse_timezone(&settings.timezone)
}

pub fn validate_working_hours(hours: &WorkingHours) -> Result<(), SettingsError> {
    if !(0..=6).contains(&hours.day_of_week) {
        return Err(SettingsError::DayOfWeek);
    }
    if hours.start_time >= hours.end_time {
        return Err(SettingsError::WorkingWindow);
    }
    Ok(())
}

pub fn parse_timezone(name: &str) -> Result<Tz, SettingsError> {
    name.parse::<Tz>()
        .map_err(|_| SettingsError::Timezone(name.to_string()))
}

/// Snapshot of everything that decides whether a slot can be offered.
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    pub settings: AdminSettings,
    pub timezone: Tz,
    working_hours: HashMap<i64, WorkingHours>,
    blocked_dates: HashSet<NaiveDate>,
}

impl SchedulingContext {
    pub fn new(
        settings: AdminSettings,
        working_hours: Vec<WorkingHours>,
        blocked_dates: Vec<BlockedDate>,
    ) -> Result<Self, SettingsError> {
        let timezone = parse_timezone(&settings.timezone)?;
        Ok(Self {
            settings,
            timezone,
            working_hours: working_hours
                .into_iter()
                .map(|wh| (wh.day_of_week, wh))
                .collect(),
            blocked_dates: blocked_dates.into_iter().map(|b| b.blocked_date).collect(),
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.settings.appointment_duration_minutes)
    }

    /// Distance between two consecutive slot starts.
    pub fn step(&self) -> Duration {
        Duration::minutes(self.settings.appointment_duration_minutes + self.settings.buffer_minutes.max(0))
    }

    pub fn hours_for(&self, date: NaiveDate) -> Option<&WorkingHours> {
        self.working_hours.get(&day_of_week(date))
    }

    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        self.blocked_dates.contains(&date)
    }

    /// The calendar date at `now` in the scheduling timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    pub fn last_bookable_date(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = self.today(now);
        today
            .checked_add_signed(Duration::days(self.settings.advance_booking_days.max(0)))
            .unwrap_or(today)
    }

    /// Local wall-clock time to UTC. `None` inside a DST gap; an ambiguous
    /// time resolves to its first occurrence.
    pub fn to_utc(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        local_to_utc(&self.timezone, date.and_time(time))
    }

    /// `[00:00, next day 00:00)` of `date` in local time, as UTC.
    pub fn day_window(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
        let start = self.to_utc(date, midnight)?;
        let end = self.to_utc(date.succ_opt()?, midnight)?;
        Some((start, end))
    }
}

pub fn local_to_utc(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A date is bookable when it lies in `[today, today + advance_booking_days]`,
/// its weekday is open and it is not blocked.
pub fn is_date_available(ctx: &SchedulingContext, date: NaiveDate, now: DateTime<Utc>) -> bool {
    if date < ctx.today(now) || date > ctx.last_bookable_date(now) {
        return false;
    }
    if ctx.is_blocked(date) {
        return false;
    }
    ctx.hours_for(date).is_some_and(|wh| wh.is_available)
}

/// Slot starts the working hours allow on `date`, ignoring bookings.
///
/// Starts at the opening time and advances by duration plus buffer while the
/// whole appointment still ends by closing time.
pub fn candidate_slots(ctx: &SchedulingContext, date: NaiveDate, now: DateTime<Utc>) -> Vec<NaiveTime> {
    if !is_date_available(ctx, date, now) {
        return Vec::new();
    }
    let Some(hours) = ctx.hours_for(date) else {
        return Vec::new();
    };

    let duration = ctx.duration();
    let step = ctx.step();
    if duration <= Duration::zero() || step <= Duration::zero() {
        return Vec::new();
    }

    let close = date.and_time(hours.end_time);
    let mut slot = date.and_time(hours.start_time);
    let mut slots = Vec::new();
    while slot + duration <= close {
        slots.push(slot.time());
        slot += step;
    }
    slots
}

fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Bookable slot starts on `date`.
///
/// Candidates are removed when they overlap a non-cancelled appointment on the
/// same date or a busy interval, and on the current day when they do not start
/// after `now`.
pub fn compute_slots(
    ctx: &SchedulingContext,
    date: NaiveDate,
    now: DateTime<Utc>,
    booked: &[Appointment],
    busy: &[BusyInterval],
) -> Vec<NaiveTime> {
    let duration = ctx.duration();
    let booked: Vec<(NaiveDateTime, NaiveDateTime)> = booked
        .iter()
        .filter(|a| a.appointment_date == date && !a.status.is_cancelled())
        .map(|a| {
            let start = a.appointment_date.and_time(a.appointment_time);
            (start, start + Duration::minutes(a.duration_minutes.max(0)))
        })
        .collect();

    candidate_slots(ctx, date, now)
        .into_iter()
        .filter(|&time| {
            let start = date.and_time(time);
            let end = start + duration;
            !booked.iter().any(|&(b_start, b_end)| overlaps(start, end, b_start, b_end))
        })
        .filter(|&time| {
            let Some(start_utc) = ctx.to_utc(date, time) else {
                return false;
            };
            if start_utc <= now {
                return false;
            }
            let end_utc = start_utc + duration;
            !busy
                .iter()
                .any(|&(b_start, b_end)| overlaps(start_utc, end_utc, b_start, b_end))
        })
        .collect()
}

/// Bookable dates in `[from, to]`, clipped to the advance-booking window.
pub fn available_dates(
    ctx: &SchedulingContext,
    from: NaiveDate,
    to: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<NaiveDate> {
    let first = from.max(ctx.today(now));
    let last = to.min(ctx.last_bookable_date(now));
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| is_date_available(ctx, *d, now))
        .collect()
}

/// One busy interval as the booking UI receives it.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Busy intervals for a day, and whether they came from a configured calendar.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusyPeriods {
    pub periods: Vec<BusyPeriod>,
    pub configured: bool,
}

impl BusyPeriods {
    pub fn unconfigured() -> Self {
        Self {
            periods: Vec::new(),
            configured: false,
        }
    }

    pub fn intervals(&self) -> Vec<BusyInterval> {
        self.periods.iter().map(|p| (p.start, p.end)).collect()
    }
}

impl From<Vec<BusyInterval>> for BusyPeriods {
    fn from(intervals: Vec<BusyInterval>) -> Self {
        Self {
            periods: intervals
                .into_iter()
                .map(|(start, end)| BusyPeriod { start, end })
                .collect(),
            configured: true,
        }
    }
}
