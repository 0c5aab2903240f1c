//! Postgres implementation of [`BookingRepository`].

use async_trait::async_trait;
use bania_common::models::{
    Booking, BookingFilter, BookingStatus, DashboardStats, NewBooking, PaymentStatus,
    PaymentUpdate,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::BookingRepository;
use crate::DbClient;

const BOOKING_COLUMNS: &str = "id, calendly_event_uri, calendly_invitee_uri, event_type_name, \
    event_type_uuid, start_time, end_time, invitee_name, invitee_email, invitee_phone, \
    telegram_user_id, guests_count, status, payment_status, payment_amount, payment_notes, \
    notes, calendly_payload, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub calendly_event_uri: String,
    pub calendly_invitee_uri: String,
    pub event_type_name: String,
    pub event_type_uuid: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub invitee_name: String,
    pub invitee_email: Option<String>,
    pub invitee_phone: Option<String>,
    pub telegram_user_id: Option<i64>,
    pub guests_count: i32,
    pub status: String,
    pub payment_status: String,
    pub payment_amount: Option<f64>,
    pub payment_notes: Option<String>,
    pub notes: Option<String>,
    pub calendly_payload: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbBooking> for Booking {
    type Error = DbError;

    fn try_from(db: DbBooking) -> Result<Self, Self::Error> {
        let status: BookingStatus = db.status.parse().map_err(DbError::InvalidRow)?;
        let payment_status: PaymentStatus =
            db.payment_status.parse().map_err(DbError::InvalidRow)?;
        Ok(Self {
            id: db.id,
            calendly_event_uri: db.calendly_event_uri,
            calendly_invitee_uri: db.calendly_invitee_uri,
            event_type_name: db.event_type_name,
            event_type_uuid: db.event_type_uuid,
            start_time: db.start_time,
            end_time: db.end_time,
            invitee_name: db.invitee_name,
            invitee_email: db.invitee_email,
            invitee_phone: db.invitee_phone,
            telegram_user_id: db.telegram_user_id,
            guests_count: db.guests_count,
            status,
            payment_status,
            payment_amount: db.payment_amount,
            payment_notes: db.payment_notes,
            notes: db.notes,
            calendly_payload: db.calendly_payload,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

fn convert_rows(rows: Vec<DbBooking>) -> Result<Vec<Booking>, DbError> {
    rows.into_iter().map(Booking::try_from).collect()
}

/// Escapes LIKE wildcards so a search for "50%" matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    db_client: DbClient,
}

impl SqlBookingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

#[async_trait]
impl BookingRepository for SqlBookingRepository {
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, DbError> {
        let sql = format!(
            "INSERT INTO bookings (id, calendly_event_uri, calendly_invitee_uri, event_type_name, \
             event_type_uuid, start_time, end_time, invitee_name, invitee_email, invitee_phone, \
             telegram_user_id, guests_count, status, payment_status, calendly_payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {BOOKING_COLUMNS}"
        );
        let result = sqlx::query_as::<_, DbBooking>(&sql)
            .bind(Uuid::new_v4())
            .bind(booking.calendly_event_uri)
            .bind(booking.calendly_invitee_uri)
            .bind(booking.event_type_name)
            .bind(booking.event_type_uuid)
            .bind(booking.start_time)
            .bind(booking.end_time)
            .bind(booking.invitee_name)
            .bind(booking.invitee_email)
            .bind(booking.invitee_phone)
            .bind(booking.telegram_user_id)
            .bind(booking.guests_count)
            .bind(BookingStatus::Scheduled.as_str())
            .bind(PaymentStatus::Pending.as_str())
            .bind(booking.calendly_payload)
            .fetch_one(self.db_client.pool())
            .await;

        match result {
            Ok(row) => {
                info!("Booking {} stored", row.id);
                row.try_into()
            }
            Err(e) => {
                let err = DbError::from(e);
                if err.is_unique_violation() {
                    warn!("Booking insert hit unique constraint: {}", err);
                } else {
                    error!("Failed to insert booking: {}", err);
                }
                Err(err)
            }
        }
    }

    async fn cancel_booking(&self, invitee_uri: &str, payload: &Value) -> Result<u64, DbError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $1, calendly_payload = $2, updated_at = now() \
             WHERE calendly_invitee_uri = $3",
        )
        .bind(BookingStatus::Cancelled.as_str())
        .bind(payload)
        .bind(invitee_uri)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to cancel booking {}: {}", invitee_uri, e);
            DbError::from(e)
        })?;
        Ok(result.rows_affected())
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, DbError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        let row = sqlx::query_as::<_, DbBooking>(&sql)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(BOOKING_COLUMNS).push(" FROM bookings WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(payment) = filter.payment_status {
            qb.push(" AND payment_status = ").push_bind(payment.as_str());
        }
        if let Some(from) = filter.from {
            qb.push(" AND start_time >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND start_time <= ").push_bind(to);
        }
        if let Some(term) = filter.search_term() {
            let pattern = like_pattern(term);
            qb.push(" AND (invitee_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR invitee_email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR invitee_phone ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY start_time DESC LIMIT ")
            .push_bind(filter.effective_limit())
            .push(" OFFSET ")
            .push_bind(filter.effective_offset());

        debug!("Listing bookings with filter {:?}", filter);
        let rows = qb
            .build_query_as::<DbBooking>()
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list bookings: {}", e);
                DbError::from(e)
            })?;
        convert_rows(rows)
    }

    async fn update_payment(&self, id: Uuid, update: &PaymentUpdate) -> Result<Option<Booking>, DbError> {
        let sql = format!(
            "UPDATE bookings SET payment_status = $1, payment_amount = $2, payment_notes = $3, \
             updated_at = now() WHERE id = $4 RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DbBooking>(&sql)
            .bind(update.payment_status.as_str())
            .bind(update.payment_amount)
            .bind(&update.payment_notes)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn set_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<Option<Booking>, DbError> {
        let sql = format!(
            "UPDATE bookings SET payment_status = $1, updated_at = now() WHERE id = $2 \
             RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DbBooking>(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn dashboard_stats(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, DbError> {
        let (today_bookings, upcoming_bookings, pending_payments, total_revenue) =
            sqlx::query_as::<_, (i64, i64, i64, f64)>(
                "SELECT \
                 COUNT(*) FILTER (WHERE status = 'scheduled' AND start_time >= $1 AND start_time < $2), \
                 COUNT(*) FILTER (WHERE status = 'scheduled' AND start_time >= $3), \
                 COUNT(*) FILTER (WHERE status = 'scheduled' AND payment_status = 'pending'), \
                 COALESCE(SUM(payment_amount) FILTER (WHERE payment_status = 'paid'), 0)::DOUBLE PRECISION \
                 FROM bookings",
            )
            .bind(day_start)
            .bind(day_end)
            .bind(now)
            .fetch_one(self.db_client.pool())
            .await?;

        Ok(DashboardStats {
            today_bookings,
            upcoming_bookings,
            pending_payments,
            total_revenue,
        })
    }

    async fn upcoming_bookings(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Booking>, DbError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = 'scheduled' AND start_time >= $1 \
             ORDER BY start_time ASC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, DbBooking>(&sql)
            .bind(now)
            .bind(limit)
            .fetch_all(self.db_client.pool())
            .await?;
        convert_rows(rows)
    }
}
