//! Entity trait for plain records (places, sponsors, speakers, ...).

/// A record with identity that is not event-sourced.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
