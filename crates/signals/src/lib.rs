//! Domain events, pub/sub plumbing and model save hooks.
//!
//! - [`Event`] / [`EventEnvelope`]: facts emitted by aggregates.
//! - [`EventBus`]: fan-out of envelopes to subscribers.
//! - [`SignalRegistry`]: `post_save` receivers keyed by the saved record type.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;
pub mod signal;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use signal::{DispatchReport, PostSave, Receiver, ReceiverFailure, SignalError, SignalRegistry};
