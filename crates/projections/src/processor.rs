//! Feeds the order log into registered projections.

use domain::OrderEvent;
use futures_util::StreamExt;
use store::{EventEnvelope, EventStore};
use tokio::sync::Mutex;

use crate::Result;
use crate::projection::{OrderRecord, Projection, ProjectionPosition};

/// Aggregate type whose events reach projections.
const ORDER_AGGREGATE: &str = "Order";

/// Replays the event log into projections, tracking each one's position.
///
/// Catch-up, live delivery and rebuild all hold the position lock, so
/// concurrent callers never deliver the same event twice.
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    positions: Mutex<Vec<ProjectionPosition>>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            positions: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
        self.positions.get_mut().push(ProjectionPosition::zero());
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Position of every projection, in registration order.
    pub async fn positions(&self) -> Vec<(&'static str, ProjectionPosition)> {
        let positions = self.positions.lock().await;
        self.projections
            .iter()
            .map(|p| p.name())
            .zip(positions.iter().copied())
            .collect()
    }

    /// Streams the whole log, delivering each event to every projection
    /// that has not yet seen it.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<()> {
        let mut positions = self.positions.lock().await;

        let mut stream = self.store.stream_all().await?;
        let mut event_index: u64 = 0;
        let mut delivered: u64 = 0;

        while let Some(result) = stream.next().await {
            let envelope = result?;
            event_index += 1;

            let behind: Vec<usize> = positions
                .iter()
                .enumerate()
                .filter(|(_, pos)| pos.events_processed < event_index)
                .map(|(i, _)| i)
                .collect();
            if behind.is_empty() {
                continue;
            }

            self.deliver(&envelope, &behind, &mut positions).await?;
            delivered += behind.len() as u64;
        }

        tracing::debug!(events = event_index, delivered, "catch-up complete");
        Ok(())
    }

    /// Delivers one freshly appended event to every projection.
    #[tracing::instrument(skip(self, envelope), fields(event_type = %envelope.event_type))]
    pub async fn process_event(&self, envelope: &EventEnvelope) -> Result<()> {
        let mut positions = self.positions.lock().await;
        let all: Vec<usize> = (0..self.projections.len()).collect();
        self.deliver(envelope, &all, &mut positions).await
    }

    /// Resets every projection and replays the log from the start.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        {
            let mut positions = self.positions.lock().await;
            for (projection, position) in self.projections.iter().zip(positions.iter_mut()) {
                tracing::info!(projection = projection.name(), "resetting projection");
                projection.reset().await?;
                *position = ProjectionPosition::zero();
            }
        }
        self.run_catch_up().await
    }

    /// Decodes an order event once and applies it to the selected projections.
    /// Events of other aggregates only advance positions.
    async fn deliver(
        &self,
        envelope: &EventEnvelope,
        targets: &[usize],
        positions: &mut [ProjectionPosition],
    ) -> Result<()> {
        if envelope.aggregate_type == ORDER_AGGREGATE {
            let event: OrderEvent = envelope.decode()?;
            let record = OrderRecord {
                order_id: envelope.aggregate_id,
                version: envelope.version,
                recorded_at: envelope.timestamp,
                event: &event,
            };
            for &i in targets {
                self.projections[i].apply(&record).await?;
                metrics::counter!("projections_events_processed").increment(1);
            }
        }

        for &i in targets {
            positions[i] = positions[i].advance();
        }
        Ok(())
    }
}
