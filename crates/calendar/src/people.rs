//! Sponsors, discounts, organizers and speakers.

use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, DomainResult, Entity, UserId};

use crate::event::EventId;

eventdesk_core::typed_id!(SponsorId);
eventdesk_core::typed_id!(DiscountId);
eventdesk_core::typed_id!(OrganizerId);
eventdesk_core::typed_id!(SpeakerId);

const MAX_DISCOUNT_FIELD_LEN: usize = 50;
const MAX_PERSON_NAME_LEN: usize = 100;

/// Links a record to any number of events (duplicates ignored).
fn link(events: &mut Vec<EventId>, event_id: EventId) -> bool {
    if events.contains(&event_id) {
        return false;
    }
    events.push(event_id);
    true
}

/// Event sponsor. Sponsors contribute to many events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: SponsorId,
    events: Vec<EventId>,
}

impl Sponsor {
    pub fn new(id: SponsorId) -> Self {
        Self { id, events: Vec::new() }
    }

    pub fn sponsor(&mut self, event_id: EventId) -> bool {
        link(&mut self.events, event_id)
    }

    pub fn events(&self) -> &[EventId] {
        &self.events
    }
}

impl Entity for Sponsor {
    type Id = SponsorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Discount code valid for exactly one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: DiscountId,
    pub event_id: EventId,
    pub name: String,
    pub code: String,
}

impl Discount {
    pub fn new(
        id: DiscountId,
        event_id: EventId,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(DomainError::validation("discount code cannot be empty"));
        }
        if name.chars().count() > MAX_DISCOUNT_FIELD_LEN || code.chars().count() > MAX_DISCOUNT_FIELD_LEN {
            return Err(DomainError::validation(format!(
                "discount name and code cannot exceed {MAX_DISCOUNT_FIELD_LEN} characters"
            )));
        }
        Ok(Self {
            id,
            event_id,
            name,
            code,
        })
    }

    /// Codes are matched case-insensitively, ignoring surrounding whitespace.
    pub fn matches(&self, event_id: EventId, code: &str) -> bool {
        self.event_id == event_id && self.code.eq_ignore_ascii_case(code.trim())
    }
}

impl Entity for Discount {
    type Id = DiscountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// Organizers and speakers share one shape: static name/description captured at
// entry time, an optional linked user account and many events.
macro_rules! event_person {
    ($(#[$meta:meta])* $name:ident, $id:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub id: $id,
            pub user: Option<UserId>,
            pub name: String,
            pub description: String,
            events: Vec<EventId>,
        }

        impl $name {
            pub fn new(id: $id, name: impl Into<String>) -> DomainResult<Self> {
                let name = name.into();
                if name.chars().count() > MAX_PERSON_NAME_LEN {
                    return Err(DomainError::validation(format!(
                        "name cannot exceed {MAX_PERSON_NAME_LEN} characters"
                    )));
                }
                Ok(Self {
                    id,
                    user: None,
                    name,
                    description: String::new(),
                    events: Vec::new(),
                })
            }

            pub fn with_user(mut self, user: UserId) -> Self {
                self.user = Some(user);
                self
            }

            pub fn attach(&mut self, event_id: EventId) -> bool {
                link(&mut self.events, event_id)
            }

            pub fn events(&self) -> &[EventId] {
                &self.events
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.name)
            }
        }

        impl Entity for $name {
            type Id = $id;

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}

event_person!(
    /// Event organizer. Organizers maintain many events.
    Organizer,
    OrganizerId
);

event_person!(
    /// Event speaker. Speakers attend many events.
    Speaker,
    SpeakerId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linking_is_idempotent() {
        let event = EventId::generate();
        let mut sponsor = Sponsor::new(SponsorId::generate());
        assert!(sponsor.sponsor(event));
        assert!(!sponsor.sponsor(event));
        assert!(sponsor.sponsor(EventId::generate()));
        assert_eq!(sponsor.events().len(), 2);
    }

    #[test]
    fn discount_code_matches_only_its_event() {
        let event = EventId::generate();
        let discount = Discount::new(DiscountId::generate(), event, "Members", " EARLY10 ").unwrap();
        assert_eq!(discount.code, "EARLY10");
        assert!(discount.matches(event, "early10"));
        assert!(!discount.matches(EventId::generate(), "EARLY10"));
        assert!(Discount::new(DiscountId::generate(), event, "Empty", "  ").is_err());
    }

    #[test]
    fn speakers_and_organizers_display_their_name() {
        let user = UserId::new();
        let mut speaker = Speaker::new(SpeakerId::generate(), "Ada Lovelace")
            .unwrap()
            .with_user(user);
        assert!(speaker.attach(EventId::generate()));
        assert_eq!(speaker.to_string(), "Ada Lovelace");
        assert_eq!(speaker.user, Some(user));

        let organizer = Organizer::new(OrganizerId::generate(), "").unwrap();
        assert_eq!(organizer.to_string(), "");
        assert!(Organizer::new(OrganizerId::generate(), "n".repeat(101)).is_err());
    }
}
