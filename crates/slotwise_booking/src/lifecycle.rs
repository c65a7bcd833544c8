// --- File: crates/slotwise_booking/src/lifecycle.rs ---
//! Appointment lifecycle: availability lookups, create, reschedule, cancel,
//! plus the admin operations that feed the calculator.
//!
//! Calendar writes follow a two-phase pattern. On create the calendar event is
//! made first and the row second, so a failed insert only leaves an event
//! behind (deleted right away, or later by the reconciliation sweep). On
//! reschedule and cancel the row is the authoritative write and the calendar
//! follows on a best-effort basis.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use slotwise_common::models::{
    format_time, AdminSettings, Appointment, AppointmentStatus, BlockedDate, NewAppointment,
    WorkingHours,
};
use slotwise_common::services::{CalendarGateway, GatewayError, NewCalendarEvent, NotificationService};
use slotwise_config::AppConfig;
use slotwise_db::{
    AppointmentRepository, DbClient, SchedulingRepository, SqlAppointmentRepository,
    SqlSchedulingRepository,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::availability::{
    self, validate_settings, validate_working_hours, BusyPeriods, SchedulingContext,
};
use crate::error::BookingError;
use crate::notifications::{self, Email};
use crate::token::{generate_token, is_well_formed};

/// Widest range a single date listing or sweep may cover.
pub const MAX_RANGE_DAYS: i64 = 366;
/// Events younger than this are left alone by the sweep, their booking may still be in flight.
pub const RECONCILE_GRACE_MINUTES: i64 = 15;

const MAX_NAME_LENGTH: usize = 200;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NOTES_LENGTH: usize = 2000;

#[derive(Debug, Clone)]
pub struct BookingOptions {
    /// Base of the manage link sent to guests.
    pub public_base_url: String,
    /// Title of created calendar events; the guest name is appended.
    pub event_summary: String,
}

impl Default for BookingOptions {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080".to_string(),
            event_summary: "Appointment".to_string(),
        }
    }
}

impl BookingOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let event_summary = config
            .gcal
            .as_ref()
            .and_then(|gcal| gcal.event_summary.clone())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::default().event_summary);
        Self {
            public_base_url: config.booking.public_base_url.clone(),
            event_summary,
        }
    }
}

/// Contact details a guest enters in the booking form.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_plausible_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

impl GuestDetails {
    /// Trimmed copy, or a validation error naming the first bad field.
    pub fn normalized(self) -> Result<Self, BookingError> {
        let name = self.name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(BookingError::Validation(
                "name must be between 1 and 200 characters".to_string(),
            ));
        }
        let email = self.email.trim().to_string();
        if !is_plausible_email(&email) {
            return Err(BookingError::Validation(format!("'{email}' is not a valid email address")));
        }
        let notes = trimmed(self.notes);
        if notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES_LENGTH) {
            return Err(BookingError::Validation(
                "notes must not exceed 2000 characters".to_string(),
            ));
        }
        Ok(Self {
            name,
            email,
            phone: trimmed(self.phone),
            notes,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub guest: GuestDetails,
    pub assessment_id: Option<String>,
}

/// Slots for one date as the booking widget shows them.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available: bool,
    /// Slot starts as "HH:MM" in `timezone`.
    pub slots: Vec<String>,
    pub duration_minutes: i64,
    pub timezone: String,
    /// `false` when busy times from the external calendar were not consulted.
    pub calendar_configured: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct AvailableDates {
    pub dates: Vec<NaiveDate>,
    pub timezone: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentConfirmation {
    pub appointment: Appointment,
    pub meeting_join_url: String,
    pub manage_url: String,
    /// The manage-link token. Shown once, the guest keeps it.
    pub token: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
    pub skipped_recent: usize,
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), BookingError> {
    if to < from {
        return Err(BookingError::Validation("'to' must not be before 'from'".to_string()));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(BookingError::Validation(
            "date range must not exceed 366 days".to_string(),
        ));
    }
    Ok(())
}

pub struct BookingService {
    appointments: SqlAppointmentRepository,
    scheduling: SqlSchedulingRepository,
    db: DbClient,
    gateway: Arc<dyn CalendarGateway>,
    notifier: Option<Arc<dyn NotificationService>>,
    options: BookingOptions,
}

impl BookingService {
    pub fn new(
        db: DbClient,
        gateway: Arc<dyn CalendarGateway>,
        notifier: Option<Arc<dyn NotificationService>>,
        options: BookingOptions,
    ) -> Self {
        Self {
            appointments: SqlAppointmentRepository::new(db.clone()),
            scheduling: SqlSchedulingRepository::new(db.clone()),
            db,
            gateway,
            notifier,
            options,
        }
    }

    /// Create tables and seed settings on first start.
    pub async fn init_schema(&self, defaults: &AdminSettings) -> Result<(), BookingError> {
        self.appointments.init_schema().await?;
        self.scheduling.init_schema(defaults).await?;
        Ok(())
    }

    pub async fn is_healthy(&self) -> bool {
        self.db.is_healthy().await
    }

    pub fn manage_url(&self, token: &str) -> String {
        format!(
            "{}/booking/manage?token={}",
            self.options.public_base_url.trim_end_matches('/'),
            token
        )
    }

    /// Current settings, working hours and blocked dates.
    pub async fn scheduling_context(&self) -> Result<SchedulingContext, BookingError> {
        let settings = self.scheduling.get_settings().await?;
        let working_hours = self.scheduling.list_working_hours().await?;
        let blocked_dates = self.scheduling.list_blocked_dates().await?;
        SchedulingContext::new(settings, working_hours, blocked_dates)
            .map_err(|err| BookingError::Storage(format!("stored settings are invalid: {err}")))
    }

    // --- Availability ---

    pub async fn available_slots(&self, date: NaiveDate) -> Result<DayAvailability, BookingError> {
        let ctx = self.scheduling_context().await?;
        let now = Utc::now();
        let available = availability::is_date_available(&ctx, date, now);

        let (slots, calendar_configured) = if available {
            let booked = self.appointments.list_active_on(date).await?;
            let busy = self.busy_periods_for(&ctx, date).await;
            let slots = availability::compute_slots(&ctx, date, now, &booked, &busy.intervals());
            (slots, busy.configured)
        } else {
            (Vec::new(), self.gateway.is_configured())
        };

        debug!("{} open slot(s) on {}", slots.len(), date);
        Ok(DayAvailability {
            date,
            available,
            slots: slots.into_iter().map(format_time).collect(),
            duration_minutes: ctx.settings.appointment_duration_minutes,
            timezone: ctx.settings.timezone.clone(),
            calendar_configured,
        })
    }

    pub async fn available_dates(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AvailableDates, BookingError> {
        check_range(from, to)?;
        let ctx = self.scheduling_context().await?;
        Ok(AvailableDates {
            dates: availability::available_dates(&ctx, from, to, Utc::now()),
            timezone: ctx.settings.timezone.clone(),
        })
    }

    /// Busy intervals on `date` from the external calendar. Never fails on
    /// gateway problems; the result says whether the calendar was consulted.
    pub async fn fetch_busy_periods(&self, date: NaiveDate) -> Result<BusyPeriods, BookingError> {
        let ctx = self.scheduling_context().await?;
        Ok(self.busy_periods_for(&ctx, date).await)
    }

    async fn busy_periods_for(&self, ctx: &SchedulingContext, date: NaiveDate) -> BusyPeriods {
        if !self.gateway.is_configured() {
            debug!("Calendar gateway not configured, skipping busy lookup for {}", date);
            return BusyPeriods::unconfigured();
        }
        let Some((start, end)) = ctx.day_window(date) else {
            warn!("Cannot resolve day window for {} in {}", date, ctx.settings.timezone);
            return BusyPeriods::from(Vec::new());
        };
        match self.gateway.get_busy_times(start, end).await {
            Ok(intervals) => BusyPeriods::from(intervals),
            Err(GatewayError::NotConfigured(reason)) => {
                warn!("Busy lookup skipped: {}", reason);
                BusyPeriods::unconfigured()
            }
            Err(err) => {
                warn!("Busy lookup for {} failed, showing local bookings only: {}", date, err);
                BusyPeriods::from(Vec::new())
            }
        }
    }

    // --- Lifecycle ---

    /// The slot must start in the future, on a bookable date, at one of the
    /// offered start times. Returns its start in UTC.
    fn validate_slot(
        ctx: &SchedulingContext,
        date: NaiveDate,
        time: NaiveTime,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, BookingError> {
        let start = ctx.to_utc(date, time).ok_or_else(|| {
            BookingError::Validation(format!(
                "{date} {} does not exist in {}",
                format_time(time),
                ctx.settings.timezone
            ))
        })?;
        if start <= now {
            return Err(BookingError::PastAppointment);
        }
        if !availability::is_date_available(ctx, date, now) {
            return Err(BookingError::Validation(format!("{date} is not open for booking")));
        }
        if !availability::candidate_slots(ctx, date, now).contains(&time) {
            return Err(BookingError::Validation(format!(
                "{} is not a bookable start time on {date}",
                format_time(time)
            )));
        }
        Ok(start)
    }

    pub async fn create_appointment(
        &self,
        request: BookingRequest,
    ) -> Result<AppointmentConfirmation, BookingError> {
        let guest = request.guest.normalized()?;
        let ctx = self.scheduling_context().await?;
        let (date, time) = (request.date, request.time);
        let start = Self::validate_slot(&ctx, date, time, Utc::now())?;

        if self.appointments.find_active_at(date, time, None).await?.is_some() {
            debug!("Slot {} {} already taken", date, format_time(time));
            return Err(BookingError::SlotConflict);
        }

        let event = NewCalendarEvent {
            start_time: start,
            end_time: start + ctx.duration(),
            time_zone: ctx.settings.timezone.clone(),
            summary: format!("{} with {}", self.options.event_summary, guest.name),
            description: guest.notes.clone(),
            attendee_email: guest.email.clone(),
            attendee_name: Some(guest.name.clone()),
        };
        let created = self.gateway.create_event(event).await.map_err(|err| {
            warn!("Calendar event for {} {} not created: {}", date, format_time(time), err);
            BookingError::from(err)
        })?;

        let token = generate_token();
        let new_appointment = NewAppointment {
            appointment_date: date,
            appointment_time: time,
            duration_minutes: ctx.settings.appointment_duration_minutes,
            guest_name: guest.name.clone(),
            guest_email: guest.email.clone(),
            guest_phone: guest.phone.clone(),
            notes: guest.notes.clone(),
            cancel_token: token.clone(),
            meeting_id: created.event_id.clone(),
            meeting_join_url: created.meeting_join_url.clone(),
            assessment_id: request.assessment_id.clone(),
        };
        let appointment = match self.appointments.insert(new_appointment).await {
            Ok(appointment) => appointment,
            Err(err) => {
                warn!("Insert failed after creating event {}: {}", created.event_id, err);
                self.discard_event(&created.event_id).await;
                return Err(err.into());
            }
        };
        info!(
            "Booked appointment {} on {} at {}",
            appointment.id,
            date,
            format_time(time)
        );

        if let Some(assessment_id) = &request.assessment_id {
            match self.appointments.link_assessment(assessment_id, &appointment.id).await {
                Ok(true) => debug!("Linked assessment {} to {}", assessment_id, appointment.id),
                Ok(false) => warn!("Assessment {} not found, nothing linked", assessment_id),
                Err(err) => warn!("Linking assessment {} failed: {}", assessment_id, err),
            }
        }

        let manage_url = self.manage_url(&token);
        let email = notifications::confirmation(
            &appointment,
            &created.meeting_join_url,
            &manage_url,
            &ctx.settings.timezone,
        );
        self.notify(&appointment.guest_email, email).await;

        Ok(AppointmentConfirmation {
            appointment,
            meeting_join_url: created.meeting_join_url,
            manage_url,
            token,
        })
    }

    async fn discard_event(&self, event_id: &str) {
        match self.gateway.delete_event(event_id).await {
            Ok(()) => info!("Deleted orphaned calendar event {}", event_id),
            Err(err) => error!(
                "Calendar event {} is orphaned and must be reconciled: {}",
                event_id, err
            ),
        }
    }

    pub async fn get_appointment_by_token(&self, token: &str) -> Result<Appointment, BookingError> {
        if !is_well_formed(token) {
            return Err(BookingError::NotFound);
        }
        self.appointments
            .find_by_token(token)
            .await?
            .ok_or(BookingError::NotFound)
    }

    /// The appointment behind `token`, if it can still be changed.
    async fn changeable_by_token(
        &self,
        ctx: &SchedulingContext,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.get_appointment_by_token(token).await?;
        if appointment.status.is_cancelled() {
            return Err(BookingError::AlreadyCancelled);
        }
        let started = ctx
            .to_utc(appointment.appointment_date, appointment.appointment_time)
            .is_some_and(|start| start <= now);
        if started {
            return Err(BookingError::PastAppointment);
        }
        Ok(appointment)
    }

    pub async fn reschedule_appointment(
        &self,
        token: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Appointment, BookingError> {
        let ctx = self.scheduling_context().await?;
        let now = Utc::now();
        let current = self.changeable_by_token(&ctx, token, now).await?;
        let start = Self::validate_slot(&ctx, date, time, now)?;

        if self
            .appointments
            .find_active_at(date, time, Some(&current.id))
            .await?
            .is_some()
        {
            return Err(BookingError::SlotConflict);
        }
        if !self.appointments.update_schedule(&current.id, date, time).await? {
            return Err(BookingError::AlreadyCancelled);
        }
        info!(
            "Moved appointment {} from {} {} to {} {}",
            current.id,
            current.appointment_date,
            format_time(current.appointment_time),
            date,
            format_time(time)
        );

        let end = start + Duration::minutes(current.duration_minutes);
        let refreshed_link = self
            .follow_reschedule(&current, start, end, &ctx.settings.timezone)
            .await;

        let moved = Appointment {
            appointment_date: date,
            appointment_time: time,
            meeting_join_url: refreshed_link.or_else(|| current.meeting_join_url.clone()),
            updated_at: Some(now),
            ..current.clone()
        };
        let updated = self.reread_after_write(moved).await;
        let email = notifications::rescheduled(
            &updated,
            current.appointment_date,
            current.appointment_time,
            &self.manage_url(token),
            &ctx.settings.timezone,
        );
        self.notify(&updated.guest_email, email).await;
        Ok(updated)
    }

    /// Moves the calendar event. Returns the provider's new link once stored.
    async fn follow_reschedule(
        &self,
        current: &Appointment,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        timezone: &str,
    ) -> Option<String> {
        let Some(event_id) = current.meeting_id.as_deref() else {
            warn!("Appointment {} has no calendar event to move", current.id);
            return None;
        };
        let patched = match self.gateway.patch_event_window(event_id, start, end, timezone).await {
            Ok(patched) => patched,
            Err(err) => {
                error!("Calendar event {} not moved: {}", event_id, err);
                return None;
            }
        };
        let url = patched.meeting_join_url?;
        if current.meeting_join_url.as_deref() == Some(url.as_str()) {
            return None;
        }
        match self.appointments.update_meeting_link(&current.id, &url).await {
            Ok(_) => {
                debug!("Stored refreshed meeting link for {}", current.id);
                Some(url)
            }
            Err(err) => {
                error!("Refreshed meeting link for {} not stored: {}", current.id, err);
                None
            }
        }
    }

    /// Fresh copy of a row whose change is already committed. A failed read
    /// falls back to `expected` instead of failing the finished operation.
    async fn reread_after_write(&self, expected: Appointment) -> Appointment {
        match self.appointments.find_by_id(&expected.id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                warn!("Appointment {} vanished after update", expected.id);
                expected
            }
            Err(err) => {
                error!("Appointment {} not re-read after update: {}", expected.id, err);
                expected
            }
        }
    }

    pub async fn cancel_appointment(&self, token: &str) -> Result<Appointment, BookingError> {
        let ctx = self.scheduling_context().await?;
        let appointment = self.changeable_by_token(&ctx, token, Utc::now()).await?;

        if !self.appointments.mark_cancelled(&appointment.id).await? {
            return Err(BookingError::AlreadyCancelled);
        }
        info!("Cancelled appointment {}", appointment.id);

        match appointment.meeting_id.as_deref() {
            Some(event_id) => {
                if let Err(err) = self.gateway.delete_event(event_id).await {
                    error!("Calendar event {} not deleted: {}", event_id, err);
                }
            }
            None => warn!("Appointment {} has no calendar event to delete", appointment.id),
        }

        let cancelled = self
            .reread_after_write(Appointment {
                status: AppointmentStatus::Cancelled,
                updated_at: Some(Utc::now()),
                ..appointment.clone()
            })
            .await;
        let email = notifications::cancelled(&cancelled, &ctx.settings.timezone);
        self.notify(&cancelled.guest_email, email).await;
        Ok(cancelled)
    }

    async fn notify(&self, to: &str, email: Email) {
        let Some(notifier) = &self.notifier else {
            debug!("Email disabled, not sending '{}'", email.subject);
            return;
        };
        match notifier.send_email(to, &email.subject, &email.body).await {
            Ok(result) => debug!("Sent '{}' ({})", email.subject, result.id),
            Err(err) => error!("Email '{}' not sent: {}", email.subject, err),
        }
    }

    // --- Reconciliation ---

    /// Delete calendar events this system created that no active appointment
    /// references, within `[from, to]` local dates.
    pub async fn reconcile_orphaned_events(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ReconciliationReport, BookingError> {
        check_range(from, to)?;
        let ctx = self.scheduling_context().await?;
        let window = ctx
            .day_window(from)
            .zip(to.succ_opt().and_then(|next| ctx.day_window(next)));
        let Some(((start, _), (end, _))) = window else {
            return Err(BookingError::Validation("date range cannot be resolved".to_string()));
        };

        let events = self.gateway.list_owned_events(start, end).await?;
        let referenced: HashSet<String> =
            self.appointments.active_meeting_ids().await?.into_iter().collect();
        let grace_cutoff = Utc::now() - Duration::minutes(RECONCILE_GRACE_MINUTES);

        let mut report = ReconciliationReport::default();
        for event in events {
            report.scanned += 1;
            if event.status == "cancelled" || referenced.contains(&event.event_id) {
                continue;
            }
            if event.created_at.map_or(true, |created| created > grace_cutoff) {
                report.skipped_recent += 1;
                continue;
            }
            match self.gateway.delete_event(&event.event_id).await {
                Ok(()) => {
                    info!("Reconciliation deleted orphaned event {}", event.event_id);
                    report.deleted += 1;
                }
                Err(err) => {
                    error!("Reconciliation could not delete {}: {}", event.event_id, err);
                    report.failed += 1;
                }
            }
        }
        info!(
            "Reconciliation {}..{}: scanned {}, deleted {}, failed {}, skipped {}",
            from, to, report.scanned, report.deleted, report.failed, report.skipped_recent
        );
        Ok(report)
    }

    // --- Admin ---

    pub async fn settings(&self) -> Result<AdminSettings, BookingError> {
        Ok(self.scheduling.get_settings().await?)
    }

    pub async fn update_settings(&self, settings: AdminSettings) -> Result<AdminSettings, BookingError> {
        validate_settings(&settings)?;
        let stored = self.scheduling.update_settings(&settings).await?;
        info!("Scheduling settings updated");
        Ok(stored)
    }

    pub async fn working_hours(&self) -> Result<Vec<WorkingHours>, BookingError> {
        Ok(self.scheduling.list_working_hours().await?)
    }

    pub async fn update_working_hours(&self, hours: WorkingHours) -> Result<WorkingHours, BookingError> {
        validate_working_hours(&hours)?;
        Ok(self.scheduling.upsert_working_hours(&hours).await?)
    }

    pub async fn blocked_dates(&self) -> Result<Vec<BlockedDate>, BookingError> {
        Ok(self.scheduling.list_blocked_dates().await?)
    }

    pub async fn block_date(&self, blocked: BlockedDate) -> Result<BlockedDate, BookingError> {
        let blocked = BlockedDate {
            blocked_date: blocked.blocked_date,
            reason: trimmed(blocked.reason),
        };
        let stored = self.scheduling.add_blocked_date(&blocked).await?;
        info!("Blocked {}", stored.blocked_date);
        Ok(stored)
    }

    pub async fn unblock_date(&self, date: NaiveDate) -> Result<(), BookingError> {
        if self.scheduling.remove_blocked_date(date).await? {
            info!("Unblocked {}", date);
            Ok(())
        } else {
            Err(BookingError::NotFound)
        }
    }

    pub async fn list_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> Result<Vec<Appointment>, BookingError> {
        check_range(from, to)?;
        Ok(self
            .appointments
            .list_between(from, to, include_cancelled)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str, email: &str) -> GuestDetails {
        GuestDetails {
            name: name.to_string(),
            email: email.to_string(),
            phone: Some("  ".to_string()),
            notes: Some(" first visit ".to_string()),
        }
    }

    #[test]
    fn test_guest_is_trimmed() {
        let normalized = guest("  Ada Lovelace ", " ada@example.com").normalized().unwrap();
        assert_eq!(normalized.name, "Ada Lovelace");
        assert_eq!(normalized.email, "ada@example.com");
        assert_eq!(normalized.phone, None);
        assert_eq!(normalized.notes.as_deref(), Some("first visit"));
    }

    #[test]
    fn test_guest_rejects_bad_input() {
        assert!(matches!(
            guest(" ", "ada@example.com").normalized(),
            Err(BookingError::Validation(_))
        ));
        for email in ["ada", "ada@", "@example.com", "ada@example", "a da@example.com", "a@b@c.com"] {
            assert!(
                matches!(guest("Ada", email).normalized(), Err(BookingError::Validation(_))),
                "{email}"
            );
        }
    }

    #[test]
    fn test_range_limits() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(check_range(from, from).is_ok());
        assert!(check_range(from, from + Duration::days(365)).is_ok());
        assert!(check_range(from, from + Duration::days(366)).is_err());
        assert!(check_range(from, from - Duration::days(1)).is_err());
    }
}
