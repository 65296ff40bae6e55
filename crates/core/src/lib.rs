//! `eventdesk-core`: shared domain building blocks.
//!
//! Pure domain primitives only: identifiers, the error model, aggregate/entity
//! traits and the `Money` value object. No IO lives here.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, UserId};
pub use value_object::{Money, ValueObject};
