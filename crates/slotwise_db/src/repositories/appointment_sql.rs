//! SQL implementation of the appointment repository

use crate::error::DbError;
use crate::repositories::appointment::AppointmentRepository;
use crate::repositories::rows::{appointment_from_row, now_text, APPOINTMENT_COLUMNS};
use crate::DbClient;
use chrono::{NaiveDate, NaiveTime, Utc};
use slotwise_common::models::{
    format_date, format_time, Appointment, AppointmentStatus, NewAppointment,
};
use sqlx::Row;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        appointment_date TEXT NOT NULL,
        appointment_time TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        guest_name TEXT NOT NULL,
        guest_email TEXT NOT NULL,
        guest_phone TEXT,
        notes TEXT,
        status TEXT NOT NULL DEFAULT 'confirmed',
        cancel_token TEXT NOT NULL UNIQUE,
        meeting_id TEXT,
        meeting_join_url TEXT,
        assessment_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    // One active booking per start time. Cancelled rows free the slot.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_active_slot
        ON appointments (appointment_date, appointment_time)
        WHERE status <> 'cancelled'
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_appointments_date
        ON appointments (appointment_date)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assessment_responses (
        id TEXT PRIMARY KEY,
        appointment_id TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

/// SQL implementation of [`AppointmentRepository`]
#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    db_client: DbClient,
}

impl SqlAppointmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    async fn fetch_optional(
        &self,
        query: &str,
        binds: &[&str],
    ) -> Result<Option<Appointment>, DbError> {
        let mut q = sqlx::query(query);
        for value in binds {
            q = q.bind(*value);
        }
        let row = q
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load appointment: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        row.as_ref().map(appointment_from_row).transpose()
    }
}

impl AppointmentRepository for SqlAppointmentRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema");
        for statement in SCHEMA {
            self.db_client.execute(statement).await?;
        }
        info!("Appointment schema initialized");
        Ok(())
    }

    async fn insert(&self, new: NewAppointment) -> Result<Appointment, DbError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let now = created_at.to_rfc3339();
        debug!(
            "Inserting appointment {} for {} {}",
            id, new.appointment_date, new.appointment_time
        );

        let query = r#"
            INSERT INTO appointments (
                id, appointment_date, appointment_time, duration_minutes,
                guest_name, guest_email, guest_phone, notes, status, cancel_token,
                meeting_id, meeting_join_url, assessment_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#;

        sqlx::query(query)
            .bind(&id)
            .bind(format_date(new.appointment_date))
            .bind(format_time(new.appointment_time))
            .bind(new.duration_minutes)
            .bind(&new.guest_name)
            .bind(&new.guest_email)
            .bind(new.guest_phone.clone())
            .bind(new.notes.clone())
            .bind(AppointmentStatus::Confirmed.as_str())
            .bind(&new.cancel_token)
            .bind(&new.meeting_id)
            .bind(&new.meeting_join_url)
            .bind(new.assessment_id.clone())
            .bind(&now)
            .bind(&now)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                let err = DbError::from_write(e);
                if err.is_conflict() {
                    warn!("Slot {} {} already taken", new.appointment_date, new.appointment_time);
                } else {
                    error!("Failed to insert appointment: {}", err);
                }
                err
            })?;

        info!("Appointment {} stored", id);
        Ok(Appointment {
            id,
            appointment_date: new.appointment_date,
            appointment_time: new.appointment_time,
            duration_minutes: new.duration_minutes,
            guest_name: new.guest_name,
            guest_email: new.guest_email,
            guest_phone: new.guest_phone,
            notes: new.notes,
            status: AppointmentStatus::Confirmed,
            cancel_token: new.cancel_token,
            meeting_id: Some(new.meeting_id),
            meeting_join_url: Some(new.meeting_join_url),
            assessment_id: new.assessment_id,
            created_at: Some(created_at),
            updated_at: Some(created_at),
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, DbError> {
        let query = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1");
        self.fetch_optional(&query, &[id]).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Appointment>, DbError> {
        let query =
            format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE cancel_token = $1");
        self.fetch_optional(&query, &[token]).await
    }

    async fn find_active_at(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        exclude_id: Option<&str>,
    ) -> Result<Option<Appointment>, DbError> {
        let query = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE appointment_date = $1 AND appointment_time = $2 \
             AND status <> 'cancelled' AND id <> $3"
        );
        let date = format_date(date);
        let time = format_time(time);
        self.fetch_optional(&query, &[date.as_str(), time.as_str(), exclude_id.unwrap_or("")])
            .await
    }

    async fn list_active_on(&self, date: NaiveDate) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE appointment_date = $1 AND status <> 'cancelled' \
             ORDER BY appointment_time"
        );
        let rows = sqlx::query(&query)
            .bind(format_date(date))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list appointments on {}: {}", date, e);
                DbError::QueryError(e.to_string())
            })?;
        rows.iter().map(appointment_from_row).collect()
    }

    async fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE appointment_date >= $1 AND appointment_date <= $2 \
             AND ($3 = 1 OR status <> 'cancelled') \
             ORDER BY appointment_date, appointment_time"
        );
        let rows = sqlx::query(&query)
            .bind(format_date(from))
            .bind(format_date(to))
            .bind(i64::from(include_cancelled))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list appointments: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        rows.iter().map(appointment_from_row).collect()
    }

    async fn update_schedule(
        &self,
        id: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<bool, DbError> {
        debug!("Moving appointment {} to {} {}", id, date, time);
        let query = r#"
            UPDATE appointments
            SET appointment_date = $1, appointment_time = $2, updated_at = $3
            WHERE id = $4 AND status <> 'cancelled'
        "#;
        let result = sqlx::query(query)
            .bind(format_date(date))
            .bind(format_time(time))
            .bind(now_text())
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                let err = DbError::from_write(e);
                if !err.is_conflict() {
                    error!("Failed to reschedule appointment {}: {}", id, err);
                }
                err
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_meeting_link(&self, id: &str, meeting_join_url: &str) -> Result<bool, DbError> {
        let query = r#"
            UPDATE appointments SET meeting_join_url = $1, updated_at = $2 WHERE id = $3
        "#;
        let result = sqlx::query(query)
            .bind(meeting_join_url)
            .bind(now_text())
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update meeting link of {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_cancelled(&self, id: &str) -> Result<bool, DbError> {
        debug!("Cancelling appointment {}", id);
        let query = r#"
            UPDATE appointments
            SET status = 'cancelled', updated_at = $1
            WHERE id = $2 AND status <> 'cancelled'
        "#;
        let result = sqlx::query(query)
            .bind(now_text())
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to cancel appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn active_meeting_ids(&self) -> Result<Vec<String>, DbError> {
        let query = r#"
            SELECT meeting_id FROM appointments
            WHERE status <> 'cancelled' AND meeting_id IS NOT NULL
        "#;
        let rows = sqlx::query(query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list meeting ids: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("meeting_id").map_err(DbError::from))
            .collect()
    }

    async fn link_assessment(
        &self,
        assessment_id: &str,
        appointment_id: &str,
    ) -> Result<bool, DbError> {
        let query = r#"
            UPDATE assessment_responses SET appointment_id = $1 WHERE id = $2
        "#;
        let result = sqlx::query(query)
            .bind(appointment_id)
            .bind(assessment_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to link assessment {}: {}", assessment_id, e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(result.rows_affected() > 0)
    }
}
