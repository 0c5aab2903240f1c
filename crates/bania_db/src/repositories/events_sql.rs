//! Postgres implementation of [`EventRepository`].

use async_trait::async_trait;
use bania_common::models::{Event, EventPatch, EventSyncFields, NewEvent};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::EventRepository;
use crate::DbClient;

const EVENT_COLUMNS: &str = "id, name, slug, description_plain, description_html, photo_url, \
    price, currency, duration, calendly_url, calendly_event_uri, calendly_event_uuid, \
    max_guests, display_order, is_active, color, metadata, created_at, updated_at";

// DB-side row shape; kept separate so the shared model does not depend on sqlx.
#[derive(Debug, Clone, FromRow)]
pub struct DbEvent {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description_plain: Option<String>,
    pub description_html: Option<String>,
    pub photo_url: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub duration: i32,
    pub calendly_url: String,
    pub calendly_event_uri: Option<String>,
    pub calendly_event_uuid: Option<String>,
    pub max_guests: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub color: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbEvent> for Event {
    fn from(db: DbEvent) -> Self {
        Self {
            id: db.id,
            name: db.name,
            slug: db.slug,
            description_plain: db.description_plain,
            description_html: db.description_html,
            photo_url: db.photo_url,
            price: db.price,
            currency: db.currency,
            duration: db.duration,
            calendly_url: db.calendly_url,
            calendly_event_uri: db.calendly_event_uri,
            calendly_event_uuid: db.calendly_event_uuid,
            max_guests: db.max_guests,
            display_order: db.display_order,
            is_active: db.is_active,
            color: db.color,
            metadata: db.metadata,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlEventRepository {
    db_client: DbClient,
}

impl SqlEventRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    async fn fetch_ordered(&self, active_only: bool) -> Result<Vec<Event>, DbError> {
        let filter = if active_only { "WHERE is_active = TRUE " } else { "" };
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events {filter}ORDER BY display_order ASC, created_at ASC"
        );
        let rows = sqlx::query_as::<_, DbEvent>(&sql)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list events: {}", e);
                DbError::from(e)
            })?;
        Ok(rows.into_iter().map(Event::from).collect())
    }
}

#[async_trait]
impl EventRepository for SqlEventRepository {
    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        self.fetch_ordered(false).await
    }

    async fn list_active_events(&self) -> Result<Vec<Event>, DbError> {
        self.fetch_ordered(true).await
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, DbError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, DbEvent>(&sql)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await?;
        Ok(row.map(Event::from))
    }

    async fn find_active_event_by_slug(&self, slug: &str) -> Result<Option<Event>, DbError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1 AND is_active = TRUE \
             ORDER BY display_order ASC LIMIT 1"
        );
        let row = sqlx::query_as::<_, DbEvent>(&sql)
            .bind(slug)
            .fetch_optional(self.db_client.pool())
            .await?;
        Ok(row.map(Event::from))
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event, DbError> {
        debug!("Inserting event slug={}", event.slug);
        let sql = format!(
            "INSERT INTO events (id, name, slug, description_plain, description_html, photo_url, \
             price, currency, duration, calendly_url, calendly_event_uri, calendly_event_uuid, \
             max_guests, display_order, is_active, color, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
             COALESCE($14, (SELECT COALESCE(MAX(display_order) + 1, 0) FROM events)), $15, $16, $17) \
             RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DbEvent>(&sql)
            .bind(Uuid::new_v4())
            .bind(event.name)
            .bind(event.slug)
            .bind(event.description_plain)
            .bind(event.description_html)
            .bind(event.photo_url)
            .bind(event.price)
            .bind(event.currency)
            .bind(event.duration)
            .bind(event.calendly_url)
            .bind(event.calendly_event_uri)
            .bind(event.calendly_event_uuid)
            .bind(event.max_guests)
            .bind(event.display_order)
            .bind(event.is_active)
            .bind(event.color)
            .bind(event.metadata)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert event: {}", e);
                DbError::from(e)
            })?;
        info!("Event {} created", row.id);
        Ok(row.into())
    }

    async fn update_event(&self, id: Uuid, patch: &EventPatch) -> Result<Option<Event>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE events SET updated_at = now()");
        if let Some(v) = &patch.name {
            qb.push(", name = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.slug {
            qb.push(", slug = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.description_plain {
            qb.push(", description_plain = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.description_html {
            qb.push(", description_html = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.photo_url {
            qb.push(", photo_url = ").push_bind(v.clone());
        }
        if let Some(v) = patch.price {
            qb.push(", price = ").push_bind(v);
        }
        if let Some(v) = &patch.currency {
            qb.push(", currency = ").push_bind(v.clone());
        }
        if let Some(v) = patch.duration {
            qb.push(", duration = ").push_bind(v);
        }
        if let Some(v) = &patch.calendly_url {
            qb.push(", calendly_url = ").push_bind(v.clone());
        }
        if let Some(v) = patch.max_guests {
            qb.push(", max_guests = ").push_bind(v);
        }
        if let Some(v) = patch.display_order {
            qb.push(", display_order = ").push_bind(v);
        }
        if let Some(v) = patch.is_active {
            qb.push(", is_active = ").push_bind(v);
        }
        if let Some(v) = &patch.color {
            qb.push(", color = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.metadata {
            qb.push(", metadata = ").push_bind(v.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(EVENT_COLUMNS);

        let row = qb
            .build_query_as::<DbEvent>()
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update event {}: {}", id, e);
                DbError::from(e)
            })?;
        Ok(row.map(Event::from))
    }

    async fn update_sync_fields(&self, id: Uuid, fields: &EventSyncFields) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE events SET name = $1, slug = $2, duration = $3, description_plain = $4, \
             description_html = $5, calendly_url = $6, calendly_event_uri = $7, \
             calendly_event_uuid = $8, color = $9, updated_at = now() WHERE id = $10",
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.duration)
        .bind(&fields.description_plain)
        .bind(&fields.description_html)
        .bind(&fields.calendly_url)
        .bind(&fields.calendly_event_uri)
        .bind(&fields.calendly_event_uuid)
        .bind(&fields.color)
        .bind(id)
        .execute(self.db_client.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_display_order(&self, id: Uuid, display_order: i32) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE events SET display_order = $1, updated_at = now() WHERE id = $2")
                .bind(display_order)
                .bind(id)
                .execute(self.db_client.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await?;
        if result.rows_affected() > 0 {
            info!("Event {} deleted", id);
        }
        Ok(result.rows_affected() > 0)
    }
}
