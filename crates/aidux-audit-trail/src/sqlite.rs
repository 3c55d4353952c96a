//! SQLite-backed audit trail store.

use crate::store::AuditTrailStore;
use aidux_audit_types::{AuditEvent, AuditEventId, AuditFilter, ChangeSource, ClinicalAction};
use aidux_common_core::{StorageError, StorageResult, Timestamp};
use aidux_common_log::spans::storage_span;
use aidux_database::{storage_error, DatabasePool};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, Instrument};

const TABLE: &str = "audit_events";

/// Durable audit store over the `audit_events` table.
///
/// The schema must already be migrated (see `aidux_database::migrate`).
#[derive(Clone)]
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: String,
    resource_type: String,
    resource_id: String,
    timestamp_us: i64,
    action: String,
    field: String,
    old_value: Option<String>,
    new_value: Option<String>,
    actor_id: String,
    source: String,
}

impl TryFrom<AuditRow> for AuditEvent {
    type Error = StorageError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let id = AuditEventId::parse(&row.id).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let timestamp = Timestamp::from_micros(row.timestamp_us).ok_or_else(|| {
            StorageError::Corrupt(format!("timestamp out of range: {}", row.timestamp_us))
        })?;

        Ok(AuditEvent {
            id,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            timestamp,
            action: ClinicalAction::parse(&row.action),
            field: row.field,
            old_value: row.old_value,
            new_value: row.new_value,
            actor_id: row.actor_id,
            source: ChangeSource::parse(&row.source),
        })
    }
}

fn push_conditions<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a AuditFilter) {
    let mut first = true;
    let mut and = |builder: &mut QueryBuilder<'a, Sqlite>| {
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
    };

    if let Some(resource_type) = &filter.resource_type {
        and(builder);
        builder.push("resource_type = ").push_bind(resource_type.as_str());
    }
    if let Some(resource_id) = &filter.resource_id {
        and(builder);
        builder.push("resource_id = ").push_bind(resource_id.as_str());
    }
    if let Some(actor_id) = &filter.actor_id {
        and(builder);
        builder.push("actor_id = ").push_bind(actor_id.as_str());
    }
    if let Some(action) = &filter.action {
        and(builder);
        builder.push("action = ").push_bind(action.as_str());
    }
    if let Some(since) = filter.since {
        and(builder);
        builder.push("timestamp_us >= ").push_bind(since.as_micros());
    }
    if let Some(until) = filter.until {
        and(builder);
        builder.push("timestamp_us <= ").push_bind(until.as_micros());
    }
}

#[async_trait]
impl AuditTrailStore for SqliteAuditStore {
    async fn insert(&self, event: &AuditEvent) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO audit_events
             (id, resource_type, resource_id, timestamp_us, action, field,
              old_value, new_value, actor_id, source)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(&event.resource_type)
        .bind(&event.resource_id)
        .bind(event.timestamp.as_micros())
        .bind(event.action.as_str())
        .bind(&event.field)
        .bind(&event.old_value)
        .bind(&event.new_value)
        .bind(&event.actor_id)
        .bind(event.source.as_str())
        .execute(&self.pool)
        .instrument(storage_span(TABLE, "insert"))
        .await
        .map_err(storage_error)?;

        debug!(id = %event.id, "Audit event appended");
        Ok(())
    }

    async fn select(&self, filter: &AuditFilter) -> StorageResult<Vec<AuditEvent>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, resource_type, resource_id, timestamp_us, action, field,
                    old_value, new_value, actor_id, source
             FROM audit_events",
        );
        push_conditions(&mut builder, filter);

        // SQLite needs a LIMIT clause before OFFSET; -1 means unbounded.
        let limit = filter
            .limit
            .and_then(|l| i64::try_from(l).ok())
            .unwrap_or(-1);
        let offset = filter
            .offset
            .map(|o| i64::try_from(o).unwrap_or(i64::MAX))
            .unwrap_or(0);
        builder
            .push(" ORDER BY timestamp_us DESC, seq DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<AuditRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .instrument(storage_span(TABLE, "select"))
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(AuditEvent::try_from).collect()
    }
}
