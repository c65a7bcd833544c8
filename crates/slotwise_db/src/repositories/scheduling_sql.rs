//! SQL implementation of the scheduling repository

use crate::error::DbError;
use crate::repositories::rows::{
    blocked_date_from_row, settings_from_row, working_hours_from_row, BLOCKED_DATE_COLUMNS,
};
use crate::repositories::scheduling::SchedulingRepository;
use crate::DbClient;
use chrono::NaiveDate;
use slotwise_common::models::{format_date, format_time, AdminSettings, BlockedDate, WorkingHours};
use tracing::{debug, error, info};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS working_hours (
        day_of_week INTEGER PRIMARY KEY CHECK (day_of_week BETWEEN 0 AND 6),
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        is_available INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blocked_dates (
        blocked_date TEXT PRIMARY KEY,
        reason TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS admin_settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        appointment_duration_minutes INTEGER NOT NULL,
        buffer_minutes INTEGER NOT NULL,
        advance_booking_days INTEGER NOT NULL,
        default_monthly_capacity INTEGER NOT NULL,
        timezone TEXT NOT NULL
    )
    "#,
];

const DEFAULT_START: &str = "09:00";
const DEFAULT_END: &str = "17:00";

/// SQL implementation of [`SchedulingRepository`]
#[derive(Debug, Clone)]
pub struct SqlSchedulingRepository {
    db_client: DbClient,
}

impl SqlSchedulingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn query_error(action: &str) -> impl Fn(sqlx::Error) -> DbError + '_ {
    move |e| {
        error!("Failed to {}: {}", action, e);
        DbError::QueryError(e.to_string())
    }
}

impl SchedulingRepository for SqlSchedulingRepository {
    async fn init_schema(&self, defaults: &AdminSettings) -> Result<(), DbError> {
        debug!("Initializing scheduling schema");
        for statement in SCHEMA {
            self.db_client.execute(statement).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO admin_settings (
                id, appointment_duration_minutes, buffer_minutes,
                advance_booking_days, default_monthly_capacity, timezone
            )
            VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(defaults.appointment_duration_minutes)
        .bind(defaults.buffer_minutes)
        .bind(defaults.advance_booking_days)
        .bind(defaults.default_monthly_capacity)
        .bind(&defaults.timezone)
        .execute(self.db_client.pool())
        .await
        .map_err(query_error("seed admin settings"))?;

        // Sunday (0) and Saturday (6) start out closed.
        for day in 0_i64..=6 {
            sqlx::query(
                r#"
                INSERT INTO working_hours (day_of_week, start_time, end_time, is_available)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (day_of_week) DO NOTHING
                "#,
            )
            .bind(day)
            .bind(DEFAULT_START)
            .bind(DEFAULT_END)
            .bind(i64::from((1..=5).contains(&day)))
            .execute(self.db_client.pool())
            .await
            .map_err(query_error("seed working hours"))?;
        }

        info!("Scheduling schema initialized");
        Ok(())
    }

    async fn get_settings(&self) -> Result<AdminSettings, DbError> {
        let row = sqlx::query(
            r#"
            SELECT appointment_duration_minutes, buffer_minutes, advance_booking_days,
                   default_monthly_capacity, timezone
            FROM admin_settings WHERE id = 1
            "#,
        )
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(query_error("load admin settings"))?;

        match row {
            Some(row) => settings_from_row(&row),
            None => Err(DbError::Missing("admin_settings row 1".to_string())),
        }
    }

    async fn update_settings(&self, settings: &AdminSettings) -> Result<AdminSettings, DbError> {
        debug!("Updating admin settings: {:?}", settings);
        sqlx::query(
            r#"
            INSERT INTO admin_settings (
                id, appointment_duration_minutes, buffer_minutes,
                advance_booking_days, default_monthly_capacity, timezone
            )
            VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                appointment_duration_minutes = excluded.appointment_duration_minutes,
                buffer_minutes = excluded.buffer_minutes,
                advance_booking_days = excluded.advance_booking_days,
                default_monthly_capacity = excluded.default_monthly_capacity,
                timezone = excluded.timezone
            "#,
        )
        .bind(settings.appointment_duration_minutes)
        .bind(settings.buffer_minutes)
        .bind(settings.advance_booking_days)
        .bind(settings.default_monthly_capacity)
        .bind(&settings.timezone)
        .execute(self.db_client.pool())
        .await
        .map_err(query_error("update admin settings"))?;

        info!("Admin settings updated");
        self.get_settings().await
    }

    async fn list_working_hours(&self) -> Result<Vec<WorkingHours>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT day_of_week, start_time, end_time, is_available
            FROM working_hours ORDER BY day_of_week
            "#,
        )
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_error("list working hours"))?;
        rows.iter().map(working_hours_from_row).collect()
    }

    async fn upsert_working_hours(&self, hours: &WorkingHours) -> Result<WorkingHours, DbError> {
        debug!("Saving working hours for day {}", hours.day_of_week);
        sqlx::query(
            r#"
            INSERT INTO working_hours (day_of_week, start_time, end_time, is_available)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (day_of_week) DO UPDATE SET
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                is_available = excluded.is_available
            "#,
        )
        .bind(hours.day_of_week)
        .bind(format_time(hours.start_time))
        .bind(format_time(hours.end_time))
        .bind(i64::from(hours.is_available))
        .execute(self.db_client.pool())
        .await
        .map_err(query_error("save working hours"))?;
        Ok(hours.clone())
    }

    async fn list_blocked_dates(&self) -> Result<Vec<BlockedDate>, DbError> {
        let query = format!("SELECT {BLOCKED_DATE_COLUMNS} FROM blocked_dates ORDER BY blocked_date");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error("list blocked dates"))?;
        rows.iter().map(blocked_date_from_row).collect()
    }

    async fn add_blocked_date(&self, blocked: &BlockedDate) -> Result<BlockedDate, DbError> {
        debug!("Blocking {}", blocked.blocked_date);
        sqlx::query(
            r#"
            INSERT INTO blocked_dates (blocked_date, reason) VALUES ($1, $2)
            ON CONFLICT (blocked_date) DO UPDATE SET reason = excluded.reason
            "#,
        )
        .bind(format_date(blocked.blocked_date))
        .bind(blocked.reason.clone())
        .execute(self.db_client.pool())
        .await
        .map_err(query_error("block date"))?;
        Ok(blocked.clone())
    }

    async fn remove_blocked_date(&self, date: NaiveDate) -> Result<bool, DbError> {
        debug!("Unblocking {}", date);
        let result = sqlx::query("DELETE FROM blocked_dates WHERE blocked_date = $1")
            .bind(format_date(date))
            .execute(self.db_client.pool())
            .await
            .map_err(query_error("unblock date"))?;
        Ok(result.rows_affected() > 0)
    }
}
