use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::validate_batch;
use crate::{AggregateId, EventEnvelope, EventStore, EventStream, Result, StoreError, Version};

/// In-memory event log.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

fn current_version(events: &[EventEnvelope], aggregate_id: AggregateId) -> Option<Version> {
    events
        .iter()
        .filter(|e| e.aggregate_id == aggregate_id)
        .map(|e| e.version)
        .max()
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, expected: Version) -> Result<Version> {
        let aggregate_id = validate_batch(&events, expected)?;

        // Version check and insert happen under one write lock.
        let mut log = self.events.write().await;
        let actual = current_version(&log, aggregate_id).unwrap_or_default();
        if actual != expected {
            return Err(StoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual,
            });
        }

        let last = events.last().map(|e| e.version).unwrap_or(expected);
        log.extend(events);
        Ok(last)
    }

    async fn load(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        let log = self.events.read().await;
        let mut events: Vec<_> = log
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn stream_all(&self) -> Result<EventStream> {
        let events = self.events.read().await.clone();
        Ok(Box::pin(futures_util::stream::iter(events.into_iter().map(Ok))))
    }

    async fn aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        Ok(current_version(&self.events.read().await, aggregate_id))
    }
}
