//! Temporary on-disk SQLite databases for repository tests.
//!
//! In-memory SQLite gives every pooled connection its own database, so the
//! tests use a fresh file under the system temp dir instead.

use crate::repositories::{AppointmentRepository, SchedulingRepository};
use crate::{DbClient, SqlAppointmentRepository, SqlSchedulingRepository};
use slotwise_common::models::AdminSettings;

pub(crate) fn default_settings() -> AdminSettings {
    AdminSettings {
        appointment_duration_minutes: 30,
        buffer_minutes: 0,
        advance_booking_days: 30,
        default_monthly_capacity: 20,
        timezone: "Europe/Zurich".to_string(),
    }
}

pub(crate) async fn fresh_db() -> DbClient {
    let path = std::env::temp_dir().join(format!("slotwise-db-test-{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());
    let db = DbClient::from_url(&url).await.expect("temp database");
    SqlAppointmentRepository::new(db.clone())
        .init_schema()
        .await
        .expect("appointment schema");
    SqlSchedulingRepository::new(db.clone())
        .init_schema(&default_settings())
        .await
        .expect("scheduling schema");
    db
}
