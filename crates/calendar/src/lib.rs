//! Calendar domain module: events and the records hanging off them.
//!
//! [`Event`] is the aggregate; places, types, sponsors, discounts, organizers
//! and speakers are plain records referencing it by id.

pub mod event;
pub mod event_type;
pub mod people;
pub mod place;

pub use event::{
    AttachRegistrationConfiguration, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT, Event,
    EventCommand, EventDetails, EventDetailsUpdated, EventEvent, EventId, EventRescheduled,
    EventScheduled, RegistrationConfigurationAttached, RescheduleEvent, ScheduleEvent,
    UpdateEventDetails,
};
pub use event_type::{EventType, EventTypeId, TypeColorSet, TypeColorSetId, slugify};
pub use people::{Discount, DiscountId, Organizer, OrganizerId, Speaker, SpeakerId, Sponsor, SponsorId};
pub use place::{Place, PlaceId};
