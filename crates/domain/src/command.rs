//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use store::{EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    pub new_version: Version,
}

/// Loads aggregates from the event store and persists the events commands produce.
///
/// Appends use the loaded version as the expected version, so two commands
/// racing on one aggregate cannot both succeed.
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Replays an aggregate. Returns a default instance if it has no events.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let mut aggregate = A::default();
        for envelope in self.store.load(aggregate_id).await? {
            let event: A::Event = envelope.decode()?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }
        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(aggregate_id).await?;
        Ok(aggregate.id().is_some().then_some(aggregate))
    }

    /// Executes a command and persists the resulting events.
    ///
    /// The command function receives the current state and returns the events
    /// to record. An empty list persists nothing.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        let events = command_fn(&aggregate)?;

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        let envelopes = Self::build_envelopes(aggregate_id, current_version, &events)?;
        let new_version = self.store.append(envelopes, current_version).await?;

        for event in &events {
            aggregate.apply(event.clone());
        }
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    fn build_envelopes(
        aggregate_id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            envelopes.push(EventEnvelope::new(
                aggregate_id,
                A::aggregate_type(),
                event.event_type(),
                version,
                event,
            )?);
        }

        Ok(envelopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use store::InMemoryEventStore;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum NoteEvent {
        Written { id: AggregateId, text: String },
        Edited { text: String },
    }

    impl DomainEvent for NoteEvent {
        fn event_type(&self) -> &'static str {
            match self {
                NoteEvent::Written { .. } => "NoteWritten",
                NoteEvent::Edited { .. } => "NoteEdited",
            }
        }
    }

    #[derive(Debug, Default)]
    struct Note {
        id: Option<AggregateId>,
        text: String,
        version: Version,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("note rejected")]
    struct NoteRejected;

    impl From<NoteRejected> for DomainError {
        fn from(_: NoteRejected) -> Self {
            DomainError::NotFound {
                resource: "note",
                id: String::new(),
            }
        }
    }

    impl Aggregate for Note {
        type Event = NoteEvent;
        type Error = NoteRejected;

        fn aggregate_type() -> &'static str {
            "Note"
        }

        fn id(&self) -> Option<AggregateId> {
            self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                NoteEvent::Written { id, text } => {
                    self.id = Some(id);
                    self.text = text;
                }
                NoteEvent::Edited { text } => self.text = text,
            }
        }
    }

    fn write(id: AggregateId) -> Vec<NoteEvent> {
        vec![NoteEvent::Written {
            id,
            text: "hello".to_string(),
        }]
    }

    #[tokio::test]
    async fn execute_creates_then_updates() {
        let handler: CommandHandler<_, Note> = CommandHandler::new(InMemoryEventStore::new());
        let id = AggregateId::new();

        let created = handler.execute(id, |_| Ok(write(id))).await.unwrap();
        assert_eq!(created.new_version, Version::first());

        let edited = handler
            .execute(id, |_| {
                Ok(vec![NoteEvent::Edited {
                    text: "bye".to_string(),
                }])
            })
            .await
            .unwrap();
        assert_eq!(edited.new_version, Version::new(2));
        assert_eq!(edited.aggregate.text, "bye");

        let reloaded = handler.load(id).await.unwrap();
        assert_eq!(reloaded.text, "bye");
        assert_eq!(reloaded.version(), Version::new(2));
    }

    #[tokio::test]
    async fn rejected_command_persists_nothing() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Note> = CommandHandler::new(store.clone());

        let result = handler.execute(AggregateId::new(), |_| Err(NoteRejected)).await;
        assert!(result.is_err());
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn empty_event_list_is_a_no_op() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Note> = CommandHandler::new(store.clone());

        let result = handler.execute(AggregateId::new(), |_| Ok(vec![])).await.unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.new_version, Version::initial());
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn load_existing_distinguishes_missing() {
        let handler: CommandHandler<_, Note> = CommandHandler::new(InMemoryEventStore::new());
        let id = AggregateId::new();
        assert!(handler.load_existing(id).await.unwrap().is_none());

        handler.execute(id, |_| Ok(write(id))).await.unwrap();
        assert_eq!(handler.load_existing(id).await.unwrap().unwrap().text, "hello");
    }
}
