//! Repositories for the booking tables

pub mod appointment;
pub mod appointment_sql;
pub mod scheduling;
pub mod scheduling_sql;

mod rows;

#[cfg(test)]
mod test_db;


pub use appointment::AppointmentRepository;
pub use appointment_sql::SqlAppointmentRepository;
pub use scheduling::SchedulingRepository;
pub use scheduling_sql::SqlSchedulingRepository;
