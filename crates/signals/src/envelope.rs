use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eventdesk_core::AggregateId;

use crate::Event;

/// Envelope for an event, carrying stream metadata.
///
/// `sequence_number` is the aggregate version after the event was applied, so it is
/// monotonically increasing per stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    aggregate_id: AggregateId,
    aggregate_type: String,
    sequence_number: u64,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a batch of freshly applied events.
    ///
    /// `version_after` is the aggregate version once every event in `events` has
    /// been applied; sequence numbers are assigned backwards from it.
    pub fn wrap_all(
        aggregate_id: AggregateId,
        aggregate_type: &str,
        version_after: u64,
        events: Vec<E>,
    ) -> Vec<Self> {
        let first = version_after + 1 - events.len() as u64;
        events
            .into_iter()
            .enumerate()
            .map(|(i, ev)| {
                Self::new(
                    Uuid::now_v7(),
                    aggregate_id,
                    aggregate_type,
                    first + i as u64,
                    ev,
                )
            })
            .collect()
    }
}
