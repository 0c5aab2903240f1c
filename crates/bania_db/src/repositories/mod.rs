pub mod bookings_sql;
pub mod events_sql;

pub use bookings_sql::{DbBooking, SqlBookingRepository};
pub use events_sql::{DbEvent, SqlEventRepository};
