//! Plain-text guest emails.

use chrono::{NaiveDate, NaiveTime};
use slotwise_common::models::{format_time, Appointment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

fn when(date: NaiveDate, time: NaiveTime, timezone: &str) -> String {
    format!(
        "{} at {} ({})",
        date.format("%A, %-d %B %Y"),
        format_time(time),
        timezone
    )
}

pub fn confirmation(
    appointment: &Appointment,
    meeting_join_url: &str,
    manage_url: &str,
    timezone: &str,
) -> Email {
    let when = when(appointment.appointment_date, appointment.appointment_time, timezone);
    Email {
        subject: format!("Your appointment on {}", appointment.appointment_date),
        body: format!(
            "Hello {name},\n\n\
             your appointment is confirmed for {when} and lasts {minutes} minutes.\n\n\
             Join the video call: {meeting_join_url}\n\n\
             To reschedule or cancel, use this link: {manage_url}\n\
             Keep it private, anyone with the link can change your booking.\n",
            name = appointment.guest_name,
            minutes = appointment.duration_minutes,
        ),
    }
}

pub fn rescheduled(
    appointment: &Appointment,
    previous_date: NaiveDate,
    previous_time: NaiveTime,
    manage_url: &str,
    timezone: &str,
) -> Email {
    let before = when(previous_date, previous_time, timezone);
    let after = when(appointment.appointment_date, appointment.appointment_time, timezone);
    let meeting = appointment
        .meeting_join_url
        .as_deref()
        .map(|url| format!("Join the video call: {url}\n\n"))
        .unwrap_or_default();
    Email {
        subject: format!("Your appointment was moved to {}", appointment.appointment_date),
        body: format!(
            "Hello {name},\n\n\
             your appointment on {before} has been moved to {after}.\n\n\
             {meeting}\
             Manage your booking: {manage_url}\n",
            name = appointment.guest_name,
        ),
    }
}

pub fn cancelled(appointment: &Appointment, timezone: &str) -> Email {
    let when = when(appointment.appointment_date, appointment.appointment_time, timezone);
    Email {
        subject: format!("Your appointment on {} was cancelled", appointment.appointment_date),
        body: format!(
            "Hello {name},\n\n\
             your appointment on {when} has been cancelled.\n",
            name = appointment.guest_name,
        ),
    }
}
