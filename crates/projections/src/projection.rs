//! The projection seam: typed order records in, query-side models out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::OrderEvent;
use store::Version;

use crate::Result;

/// How far into the log a projection has read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    pub events_processed: u64,
}

impl ProjectionPosition {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn advance(&self) -> Self {
        Self {
            events_processed: self.events_processed + 1,
        }
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.events_processed)
    }
}

/// One decoded order event with its log metadata.
#[derive(Debug, Clone, Copy)]
pub struct OrderRecord<'a> {
    pub order_id: AggregateId,
    pub version: Version,
    pub recorded_at: DateTime<Utc>,
    pub event: &'a OrderEvent,
}

/// Folds order events into a read model.
///
/// Positions are kept by the [`ProjectionProcessor`](crate::ProjectionProcessor);
/// a projection only sees events it has not applied yet.
#[async_trait]
pub trait Projection: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, record: &OrderRecord<'_>) -> Result<()>;

    /// Drops all state.
    async fn reset(&self) -> Result<()>;
}
