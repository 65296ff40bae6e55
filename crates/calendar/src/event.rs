use core::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eventdesk_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use eventdesk_signals::Event as DomainEvent;

use crate::event_type::EventTypeId;
use crate::place::PlaceId;

eventdesk_core::typed_id!(
    /// Calendar event identifier.
    EventId
);

/// `strftime` pattern for dates in [`Event::dt_display`], e.g. "Thu, Aug 12, 2010".
pub const DEFAULT_DATE_FORMAT: &str = "%a, %b %d, %Y";
/// `strftime` pattern for times in [`Event::dt_display`], e.g. "08:30 AM".
pub const DEFAULT_TIME_FORMAT: &str = "%I:%M %p";

const MAX_TITLE_LEN: usize = 150;
const MAX_PASSWORD_LEN: usize = 50;

/// Descriptive fields of an event, editable independently of its schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub type_id: Option<EventTypeId>,
    pub place_id: Option<PlaceId>,
    pub entity_id: Option<AggregateId>,
    /// Hidden from listings.
    pub private: bool,
    pub password: String,
}

impl EventDetails {
    fn validate(&self) -> Result<(), DomainError> {
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::validation(format!(
                "title cannot exceed {MAX_TITLE_LEN} characters"
            )));
        }
        if self.password.chars().count() > MAX_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password cannot exceed {MAX_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Aggregate root: calendar Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    guid: Uuid,
    details: EventDetails,
    all_day: bool,
    start_dt: DateTime<Utc>,
    end_dt: DateTime<Utc>,
    /// IANA zone name the event is presented in; instants are stored in UTC.
    timezone: String,
    registration_configuration: Option<AggregateId>,
    version: u64,
    created: bool,
}

impl Event {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: EventId) -> Self {
        Self {
            id,
            guid: Uuid::nil(),
            details: EventDetails::default(),
            all_day: false,
            start_dt: DateTime::<Utc>::default(),
            end_dt: DateTime::<Utc>::default(),
            timezone: String::new(),
            registration_configuration: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> EventId {
        self.id
    }

    pub fn guid(&self) -> Uuid {
        self.guid
    }

    pub fn details(&self) -> &EventDetails {
        &self.details
    }

    pub fn title(&self) -> &str {
        &self.details.title
    }

    pub fn all_day(&self) -> bool {
        self.all_day
    }

    pub fn start_dt(&self) -> DateTime<Utc> {
        self.start_dt
    }

    pub fn end_dt(&self) -> DateTime<Utc> {
        self.end_dt
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn registration_configuration(&self) -> Option<AggregateId> {
        self.registration_configuration
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.created && now > self.end_dt
    }

    pub fn absolute_url(&self) -> String {
        format!("/events/{}/", self.id)
    }

    /// Human-readable date range using the default formats,
    /// e.g. "Thu, Aug 12, 2010 08:30 AM - 05:30 PM".
    pub fn dt_display(&self) -> String {
        self.dt_display_with(DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT)
            .unwrap_or_default()
    }

    /// Date range rendered with custom `strftime` patterns.
    ///
    /// A single-day event shows its date once. All-day events omit times.
    pub fn dt_display_with(&self, date_format: &str, time_format: &str) -> Result<String, DomainError> {
        let fmt = |dt: DateTime<Utc>, pattern: &str| -> Result<String, DomainError> {
            let mut out = String::new();
            write!(out, "{}", dt.format(pattern))
                .map_err(|_| DomainError::validation(format!("invalid format pattern: {pattern}")))?;
            Ok(out)
        };

        let start_date = fmt(self.start_dt, date_format)?;
        let end_date = fmt(self.end_dt, date_format)?;
        let same_day = self.start_dt.date_naive() == self.end_dt.date_naive();

        if self.all_day {
            return Ok(if same_day {
                start_date
            } else {
                format!("{start_date} - {end_date}")
            });
        }

        let start_time = fmt(self.start_dt, time_format)?;
        let end_time = fmt(self.end_dt, time_format)?;
        Ok(if same_day {
            format!("{start_date} {start_time} - {end_time}")
        } else {
            format!("{start_date} {start_time} - {end_date} {end_time}")
        })
    }
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.details.title)
    }
}

impl AggregateRoot for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ScheduleEvent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub event_id: EventId,
    pub details: EventDetails,
    pub all_day: bool,
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    pub timezone: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RescheduleEvent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleEvent {
    pub event_id: EventId,
    pub all_day: bool,
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    pub timezone: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateEventDetails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEventDetails {
    pub event_id: EventId,
    pub details: EventDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AttachRegistrationConfiguration (one configuration per event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachRegistrationConfiguration {
    pub event_id: EventId,
    pub configuration_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCommand {
    ScheduleEvent(ScheduleEvent),
    RescheduleEvent(RescheduleEvent),
    UpdateEventDetails(UpdateEventDetails),
    AttachRegistrationConfiguration(AttachRegistrationConfiguration),
}

/// Event: EventScheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventScheduled {
    pub event_id: EventId,
    pub guid: Uuid,
    pub details: EventDetails,
    pub all_day: bool,
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    pub timezone: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EventRescheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRescheduled {
    pub event_id: EventId,
    pub all_day: bool,
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    pub timezone: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EventDetailsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetailsUpdated {
    pub event_id: EventId,
    pub details: EventDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RegistrationConfigurationAttached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationConfigurationAttached {
    pub event_id: EventId,
    pub configuration_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventEvent {
    EventScheduled(EventScheduled),
    EventRescheduled(EventRescheduled),
    EventDetailsUpdated(EventDetailsUpdated),
    RegistrationConfigurationAttached(RegistrationConfigurationAttached),
}

impl DomainEvent for EventEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EventEvent::EventScheduled(_) => "calendar.event.scheduled",
            EventEvent::EventRescheduled(_) => "calendar.event.rescheduled",
            EventEvent::EventDetailsUpdated(_) => "calendar.event.details_updated",
            EventEvent::RegistrationConfigurationAttached(_) => {
                "calendar.event.registration_configuration_attached"
            }
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EventEvent::EventScheduled(e) => e.occurred_at,
            EventEvent::EventRescheduled(e) => e.occurred_at,
            EventEvent::EventDetailsUpdated(e) => e.occurred_at,
            EventEvent::RegistrationConfigurationAttached(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Event {
    type Command = EventCommand;
    type Event = EventEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            EventEvent::EventScheduled(e) => {
                self.id = e.event_id;
                self.guid = e.guid;
                self.details = e.details.clone();
                self.all_day = e.all_day;
                self.start_dt = e.start_dt;
                self.end_dt = e.end_dt;
                self.timezone = e.timezone.clone();
                self.created = true;
            }
            EventEvent::EventRescheduled(e) => {
                self.all_day = e.all_day;
                self.start_dt = e.start_dt;
                self.end_dt = e.end_dt;
                self.timezone = e.timezone.clone();
            }
            EventEvent::EventDetailsUpdated(e) => {
                self.details = e.details.clone();
            }
            EventEvent::RegistrationConfigurationAttached(e) => {
                self.registration_configuration = Some(e.configuration_id);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            EventCommand::ScheduleEvent(cmd) => self.handle_schedule(cmd),
            EventCommand::RescheduleEvent(cmd) => self.handle_reschedule(cmd),
            EventCommand::UpdateEventDetails(cmd) => self.handle_update_details(cmd),
            EventCommand::AttachRegistrationConfiguration(cmd) => self.handle_attach(cmd),
        }
    }
}

fn validate_schedule(start_dt: DateTime<Utc>, end_dt: DateTime<Utc>, timezone: &str) -> Result<(), DomainError> {
    if start_dt > end_dt {
        return Err(DomainError::validation("event cannot end before it starts"));
    }
    if timezone.trim().is_empty() {
        return Err(DomainError::validation("timezone is required"));
    }
    Ok(())
}

impl Event {
    fn ensure_existing(&self, event_id: EventId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != event_id {
            return Err(DomainError::invariant("event_id mismatch"));
        }
        Ok(())
    }

    fn handle_schedule(&self, cmd: &ScheduleEvent) -> Result<Vec<EventEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("event already exists"));
        }
        cmd.details.validate()?;
        validate_schedule(cmd.start_dt, cmd.end_dt, &cmd.timezone)?;

        Ok(vec![EventEvent::EventScheduled(EventScheduled {
            event_id: cmd.event_id,
            guid: Uuid::now_v7(),
            details: cmd.details.clone(),
            all_day: cmd.all_day,
            start_dt: cmd.start_dt,
            end_dt: cmd.end_dt,
            timezone: cmd.timezone.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reschedule(&self, cmd: &RescheduleEvent) -> Result<Vec<EventEvent>, DomainError> {
        self.ensure_existing(cmd.event_id)?;
        validate_schedule(cmd.start_dt, cmd.end_dt, &cmd.timezone)?;

        Ok(vec![EventEvent::EventRescheduled(EventRescheduled {
            event_id: cmd.event_id,
            all_day: cmd.all_day,
            start_dt: cmd.start_dt,
            end_dt: cmd.end_dt,
            timezone: cmd.timezone.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_details(&self, cmd: &UpdateEventDetails) -> Result<Vec<EventEvent>, DomainError> {
        self.ensure_existing(cmd.event_id)?;
        cmd.details.validate()?;

        Ok(vec![EventEvent::EventDetailsUpdated(EventDetailsUpdated {
            event_id: cmd.event_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_attach(&self, cmd: &AttachRegistrationConfiguration) -> Result<Vec<EventEvent>, DomainError> {
        self.ensure_existing(cmd.event_id)?;

        match self.registration_configuration {
            Some(existing) if existing == cmd.configuration_id => Ok(vec![]),
            Some(_) => Err(DomainError::conflict(
                "event already has a registration configuration",
            )),
            None => Ok(vec![EventEvent::RegistrationConfigurationAttached(
                RegistrationConfigurationAttached {
                    event_id: cmd.event_id,
                    configuration_id: cmd.configuration_id,
                    occurred_at: cmd.occurred_at,
                },
            )]),
        }
    }
}
