//! Persistence for Slotwise
//!
//! A thin layer over a `sqlx::Any` pool. Dates and times are kept as text
//! (`YYYY-MM-DD`, `HH:MM`, RFC 3339 timestamps) and parsed with `chrono` on
//! the way out, which keeps the queries portable between SQLite and Postgres.
//!
//! The only concurrency guarantee the booking flow relies on lives here: a
//! partial unique index on `(appointment_date, appointment_time)` for rows
//! that are not cancelled.
//!
//! ```rust,no_run
//! use slotwise_db::{AppointmentRepository, DbClient, SqlAppointmentRepository};
//!
//! async fn setup() -> Result<(), slotwise_db::DbError> {
//!     let db = DbClient::from_url("sqlite://data/slotwise.db").await?;
//!     let appointments = SqlAppointmentRepository::new(db);
//!     appointments.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use factory::DbClientFactory;

pub use repositories::{
    AppointmentRepository, SchedulingRepository, SqlAppointmentRepository,
    SqlSchedulingRepository,
};
