use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{AggregateId, EventEnvelope, Result, StoreError, Version};

/// A stream of stored events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Append-only event log.
///
/// Implementations must be thread-safe and append a batch atomically.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events for one aggregate.
    ///
    /// Fails with [`StoreError::ConcurrencyConflict`] unless the aggregate is
    /// currently at `expected`. Returns the version after the batch.
    async fn append(&self, events: Vec<EventEnvelope>, expected: Version) -> Result<Version>;

    /// All events of one aggregate, oldest first.
    async fn load(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>>;

    /// Every event in the log in append order.
    async fn stream_all(&self) -> Result<EventStream>;

    /// Current version of an aggregate, `None` if it has no events.
    async fn aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;
}

/// Checks that a batch is non-empty, targets one aggregate and carries
/// consecutive versions starting right after `expected`.
pub fn validate_batch(events: &[EventEnvelope], expected: Version) -> Result<AggregateId> {
    let first = events
        .first()
        .ok_or_else(|| StoreError::InvalidAppend("cannot append an empty batch".to_string()))?;

    let mut version = expected;
    for event in events {
        if event.aggregate_id != first.aggregate_id {
            return Err(StoreError::InvalidAppend(
                "all events in a batch must belong to the same aggregate".to_string(),
            ));
        }
        version = version.next();
        if event.version != version {
            return Err(StoreError::InvalidAppend(format!(
                "expected event version {version}, got {}",
                event.version
            )));
        }
    }

    Ok(first.aggregate_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
        EventEnvelope::new(
            aggregate_id,
            "Order",
            "Test",
            Version::new(version),
            &serde_json::json!({}),
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_batch() {
        assert!(matches!(
            validate_batch(&[], Version::initial()),
            Err(StoreError::InvalidAppend(_))
        ));
    }

    #[test]
    fn rejects_mixed_aggregates() {
        let batch = [envelope(AggregateId::new(), 1), envelope(AggregateId::new(), 2)];
        assert!(validate_batch(&batch, Version::initial()).is_err());
    }

    #[test]
    fn rejects_version_gaps() {
        let id = AggregateId::new();
        let batch = [envelope(id, 1), envelope(id, 3)];
        assert!(validate_batch(&batch, Version::initial()).is_err());

        let batch = [envelope(id, 2)];
        assert!(validate_batch(&batch, Version::initial()).is_err());
    }

    #[test]
    fn accepts_consecutive_versions() {
        let id = AggregateId::new();
        let batch = [envelope(id, 3), envelope(id, 4)];
        assert_eq!(validate_batch(&batch, Version::new(2)).unwrap(), id);
    }
}
