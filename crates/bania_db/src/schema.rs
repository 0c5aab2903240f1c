//! Table bootstrap for the events and bookings tables.

use crate::client::DbClient;
use crate::error::DbError;
use tracing::{debug, error, info};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        slug TEXT NOT NULL,
        description_plain TEXT,
        description_html TEXT,
        photo_url TEXT,
        price DOUBLE PRECISION CHECK (price IS NULL OR price >= 0),
        currency TEXT NOT NULL DEFAULT 'EUR',
        duration INTEGER NOT NULL CHECK (duration > 0),
        calendly_url TEXT NOT NULL,
        calendly_event_uri TEXT UNIQUE,
        calendly_event_uuid TEXT,
        max_guests INTEGER,
        display_order INTEGER NOT NULL DEFAULT 0,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        color TEXT,
        metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS events_display_order_idx ON events (display_order)",
    "CREATE INDEX IF NOT EXISTS events_slug_idx ON events (slug)",
    r#"CREATE TABLE IF NOT EXISTS bookings (
        id UUID PRIMARY KEY,
        calendly_event_uri TEXT NOT NULL,
        calendly_invitee_uri TEXT NOT NULL UNIQUE,
        event_type_name TEXT NOT NULL,
        event_type_uuid TEXT,
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        invitee_name TEXT NOT NULL,
        invitee_email TEXT,
        invitee_phone TEXT,
        telegram_user_id BIGINT,
        guests_count INTEGER NOT NULL DEFAULT 1,
        status TEXT NOT NULL DEFAULT 'scheduled'
            CHECK (status IN ('scheduled', 'cancelled', 'completed')),
        payment_status TEXT NOT NULL DEFAULT 'pending'
            CHECK (payment_status IN ('pending', 'paid', 'refunded')),
        payment_amount DOUBLE PRECISION,
        payment_notes TEXT,
        notes TEXT,
        calendly_payload JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS bookings_start_time_idx ON bookings (start_time)",
    "CREATE INDEX IF NOT EXISTS bookings_status_idx ON bookings (status, payment_status)",
];

/// Create the tables and indexes if they do not exist yet.
pub async fn init_schema(client: &DbClient) -> Result<(), DbError> {
    debug!("Initializing database schema ({} statements)", SCHEMA.len());
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(client.pool())
            .await
            .map_err(|e| {
                error!("Schema statement failed: {}", e);
                DbError::from(e)
            })?;
    }
    info!("Database schema is up to date");
    Ok(())
}
