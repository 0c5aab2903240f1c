//! Data access for the Bania booking services
//!
//! - [`DbClient`]: Postgres pool (full privileges, server-side only)
//! - [`schema::init_schema`]: creates the `events` and `bookings` tables
//! - [`EventRepository`] / [`BookingRepository`]: SQL and in-memory implementations
//! - [`storage`]: event photo storage (Supabase Storage or in-memory)

pub mod client;
pub mod error;
pub mod memory;
pub mod repositories;
pub mod repository;
pub mod schema;
pub mod storage;

pub use client::DbClient;
pub use error::DbError;
pub use memory::InMemoryStore;
pub use repositories::{SqlBookingRepository, SqlEventRepository};
pub use repository::{BookingRepository, EventRepository};
pub use storage::{ClientRole, MemoryStorage, PhotoStorage, StorageError, SupabaseStorage};
