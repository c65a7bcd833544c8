// --- File: crates/slotwise_common/src/models.rs ---
//! Booking domain records shared by the store, the calculator and the HTTP layer.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wire/storage format for a calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire/storage format for a time of day.
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Accepts "09:30" and "09:30:00".
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// 0 = Sunday … 6 = Saturday, matching the `working_hours.day_of_week` column.
pub fn day_of_week(date: NaiveDate) -> i64 {
    i64::from(date.weekday().num_days_from_sunday())
}

/// Serde adapter for `NaiveTime` as "HH:MM".
pub mod hhmm {
    use super::{format_time, parse_time};
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time(&raw).ok_or_else(|| D::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }
}

/// Booking status as stored in `appointments.status`.
///
/// Only `Confirmed` and `Cancelled` are produced by the booking flow; other
/// values written by the admin tooling are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Other(s) => s.as_str(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled)
    }
}

impl From<&str> for AppointmentStatus {
    fn from(value: &str) -> Self {
        match value {
            "confirmed" => AppointmentStatus::Confirmed,
            "cancelled" => AppointmentStatus::Cancelled,
            other => AppointmentStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One booked (or formerly booked) slot.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: String,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:30"))]
    pub appointment_time: NaiveTime,
    pub duration_minutes: i64,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub notes: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "confirmed"))]
    pub status: AppointmentStatus,
    /// Capability token; never echoed back in API responses.
    #[serde(skip_serializing)]
    pub cancel_token: String,
    pub meeting_id: Option<String>,
    pub meeting_join_url: Option<String>,
    pub assessment_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields the booking flow supplies when inserting an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i64,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub notes: Option<String>,
    pub cancel_token: String,
    pub meeting_id: String,
    pub meeting_join_url: String,
    pub assessment_id: Option<String>,
}

/// Recurring opening hours for one weekday.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// 0 = Sunday … 6 = Saturday
    pub day_of_week: i64,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:00"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "17:00"))]
    pub end_time: NaiveTime,
    pub is_available: bool,
}

/// A date on which nothing can be booked.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedDate {
    pub blocked_date: NaiveDate,
    pub reason: Option<String>,
}

/// The singleton scheduling settings row.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    pub appointment_duration_minutes: i64,
    pub buffer_minutes: i64,
    pub advance_booking_days: i64,
    pub default_monthly_capacity: i64,
    /// IANA zone name, e.g. "Europe/Zurich"
    pub timezone: String,
}
