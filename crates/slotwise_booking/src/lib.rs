// --- File: crates/slotwise_booking/src/lib.rs ---
//! Booking and scheduling for Slotwise.
//!
//! [`availability`] is the pure slot calculator, [`lifecycle::BookingService`]
//! drives create / reschedule / cancel against the store and the calendar
//! gateway, and [`routes::routes`] exposes both over HTTP.

pub mod auth;
pub mod availability;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod notifications;
pub mod routes;
pub mod token;

#[cfg(test)]
mod availability_proptest;

pub use error::BookingError;
pub use handlers::BookingState;
pub use lifecycle::{BookingOptions, BookingService};
pub use routes::routes;
