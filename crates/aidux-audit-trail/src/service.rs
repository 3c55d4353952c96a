//! Recording and listing audit events.

use crate::store::AuditTrailStore;
use aidux_audit_types::{AuditEvent, AuditEventId, AuditFilter, AuditStats, NewAuditEvent};
use aidux_common_config::AuditConfig;
use aidux_common_core::{Error, Result, Timestamp};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Records clinical changes and reconstructs their history.
///
/// Storage failures are returned to the caller as-is. Nothing is retried here;
/// audit writes must not hold up the clinical operation that triggered them.
#[derive(Clone)]
pub struct AuditTrailService {
    store: Arc<dyn AuditTrailStore>,
    config: AuditConfig,
}

impl AuditTrailService {
    pub fn new(store: Arc<dyn AuditTrailStore>) -> Self {
        Self::with_config(store, AuditConfig::default())
    }

    pub fn with_config(store: Arc<dyn AuditTrailStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Append one change to the trail.
    ///
    /// The id and timestamp are assigned here. A missing actor is replaced by
    /// the configured sentinel; no-op changes are recorded like any other.
    /// Actions and sources outside the known taxonomy are rejected.
    #[instrument(
        skip(self, change),
        fields(resource_id = %change.resource_id, action = %change.action)
    )]
    pub async fn record(&self, change: NewAuditEvent) -> Result<AuditEvent> {
        if change.resource_type.trim().is_empty() {
            return Err(Error::validation("resource_type must not be empty"));
        }
        if change.resource_id.trim().is_empty() {
            return Err(Error::validation("resource_id must not be empty"));
        }
        if change.action.is_unrecognized() {
            return Err(Error::validation(format!(
                "unknown clinical action: {}",
                change.action
            )));
        }
        if change.source.is_unrecognized() {
            return Err(Error::validation(format!(
                "unknown change source: {}",
                change.source
            )));
        }
        if change.actor_id.is_none() {
            debug!(default_actor = %self.config.default_actor, "Change recorded without actor");
        }

        let event = change.into_event(
            AuditEventId::new(),
            Timestamp::now(),
            &self.config.default_actor,
        );

        if let Err(e) = self.store.insert(&event).await {
            warn!(error = %e, "Failed to append audit event");
            return Err(e.into());
        }

        debug!(id = %event.id, "Audit event recorded");
        Ok(event)
    }

    /// Events matching `filter`, most recent first.
    ///
    /// Without an explicit limit the configured default page size applies.
    /// An empty result is not an error.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: AuditFilter) -> Result<Vec<AuditEvent>> {
        filter.validate(self.config.max_list_limit)?;

        let filter = AuditFilter {
            limit: filter.limit.or(Some(self.config.default_list_limit)),
            ..filter
        };

        self.store.select(&filter).await.map_err(|e| {
            warn!(error = %e, "Failed to load audit history");
            e.into()
        })
    }

    /// Full history of one resource, most recent first. Not paged.
    #[instrument(skip(self))]
    pub async fn history_for(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Vec<AuditEvent>> {
        let filter = AuditFilter::for_resource(resource_id).resource_type(resource_type);
        filter.validate(self.config.max_list_limit)?;

        self.store.select(&filter).await.map_err(|e| {
            warn!(error = %e, "Failed to load resource history");
            e.into()
        })
    }

    /// Changes made by one actor.
    pub async fn by_actor(&self, actor_id: &str) -> Result<Vec<AuditEvent>> {
        self.list(AuditFilter::new().actor(actor_id)).await
    }

    /// The most recent changes across all resources.
    pub async fn latest(&self, limit: usize) -> Result<Vec<AuditEvent>> {
        self.list(AuditFilter::new().limit(limit)).await
    }

    /// Changes inside an inclusive time window.
    pub async fn between(&self, since: Timestamp, until: Timestamp) -> Result<Vec<AuditEvent>> {
        self.list(AuditFilter::new().since(since).until(until)).await
    }

    /// Counts by action and actor, over every event or one resource type.
    #[instrument(skip(self))]
    pub async fn stats(&self, resource_type: Option<&str>) -> Result<AuditStats> {
        let mut filter = AuditFilter::new();
        if let Some(resource_type) = resource_type {
            filter = filter.resource_type(resource_type);
        }
        filter.validate(self.config.max_list_limit)?;

        let events = self.store.select(&filter).await?;
        Ok(AuditStats::from_events(&events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryAuditStore;
    use aidux_audit_types::{ChangeSource, ClinicalAction};
    use aidux_common_config::DEFAULT_ACTOR;

    fn service() -> (Arc<MemoryAuditStore>, AuditTrailService) {
        let store = Arc::new(MemoryAuditStore::new());
        (store.clone(), AuditTrailService::new(store))
    }

    #[tokio::test]
    async fn test_record_assigns_id_and_timestamp() {
        let (_, service) = service();
        let before = Timestamp::now();

        let event = service
            .record(
                AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated)
                    .field("motivo")
                    .actor("doctor@aiduxcare.com"),
            )
            .await
            .unwrap();

        assert!(event.id.to_string().starts_with("aud_"));
        assert!(event.timestamp >= before);
    }

    #[tokio::test]
    async fn test_missing_actor_uses_sentinel() {
        let (_, service) = service();
        let event = service
            .record(AuditEvent::builder("visit", "visit-1", ClinicalAction::FormSubmitted))
            .await
            .unwrap();
        assert_eq!(event.actor_id, DEFAULT_ACTOR);
    }

    #[tokio::test]
    async fn test_custom_sentinel() {
        let store = Arc::new(MemoryAuditStore::new());
        let service = AuditTrailService::with_config(
            store,
            AuditConfig {
                default_actor: "anonymous".into(),
                ..Default::default()
            },
        );
        let event = service
            .record(AuditEvent::builder("visit", "visit-1", ClinicalAction::ManualEdit))
            .await
            .unwrap();
        assert_eq!(event.actor_id, "anonymous");
    }

    #[tokio::test]
    async fn test_noop_change_is_recorded() {
        let (store, service) = service();
        service
            .record(
                AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated)
                    .field("motivo")
                    .old_value("Dolor")
                    .new_value("Dolor"),
            )
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_record_rejects_missing_resource() {
        let (store, service) = service();
        let err = service
            .record(AuditEvent::builder("visit", "  ", ClinicalAction::FieldUpdated))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_record_rejects_values_outside_taxonomy() {
        let (store, service) = service();

        let err = service
            .record(AuditEvent::builder(
                "visit",
                "visit-1",
                ClinicalAction::Unrecognized("fild_updated".into()),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("fild_updated")));

        let err = service
            .record(
                AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated)
                    .source(ChangeSource::Unrecognized("bot".into())),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("bot")));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_history_is_not_capped_by_page_size() {
        let store = Arc::new(MemoryAuditStore::new());
        let service = AuditTrailService::with_config(
            store,
            AuditConfig {
                default_list_limit: 2,
                max_list_limit: 3,
                ..Default::default()
            },
        );
        for i in 0..5 {
            service
                .record(
                    AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated)
                        .new_value(i.to_string()),
                )
                .await
                .unwrap();
        }
        service
            .record(AuditEvent::builder("visit", "visit-2", ClinicalAction::FieldUpdated))
            .await
            .unwrap();

        let history = service.history_for("visit", "visit-1").await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].new_value.as_deref(), Some("4"));
        assert_eq!(history[4].new_value.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_storage_error_surfaces() {
        let (store, service) = service();
        store.set_available(false);

        let err = service
            .record(AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.is_retryable());

        let err = service.list(AuditFilter::new()).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_list_applies_default_limit() {
        let store = Arc::new(MemoryAuditStore::new());
        let service = AuditTrailService::with_config(
            store,
            AuditConfig {
                default_list_limit: 3,
                max_list_limit: 10,
                ..Default::default()
            },
        );
        for i in 0..5 {
            service
                .record(
                    AuditEvent::builder("visit", "visit-1", ClinicalAction::FieldUpdated)
                        .new_value(i.to_string()),
                )
                .await
                .unwrap();
        }

        assert_eq!(service.list(AuditFilter::new()).await.unwrap().len(), 3);
        assert_eq!(service.list(AuditFilter::new().limit(10)).await.unwrap().len(), 5);
        assert!(matches!(
            service.list(AuditFilter::new().limit(11)).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_ignore_page_size() {
        let store = Arc::new(MemoryAuditStore::new());
        let service = AuditTrailService::with_config(
            store,
            AuditConfig {
                default_list_limit: 1,
                ..Default::default()
            },
        );
        for (action, source) in [
            (ClinicalAction::AiSuggestionAccepted, ChangeSource::Copilot),
            (ClinicalAction::AiSuggestionRejected, ChangeSource::Copilot),
            (ClinicalAction::ManualEdit, ChangeSource::User),
        ] {
            service
                .record(
                    AuditEvent::builder("visit", "visit-1", action)
                        .actor("dr")
                        .source(source),
                )
                .await
                .unwrap();
        }
        service
            .record(AuditEvent::builder("patient", "patient-1", ClinicalAction::ManualEdit))
            .await
            .unwrap();

        let stats = service.stats(Some("visit")).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_actor["dr"], 3);
        assert_eq!(service.stats(None).await.unwrap().total, 4);
    }
}
