use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use eventdesk_calendar::EventId;
use eventdesk_core::{DomainError, DomainResult, Entity, UserId};

use crate::registration::{Registration, RegistrationId};

eventdesk_core::typed_id!(
    /// Registrant identifier.
    RegistrantId
);

/// A person attending an event under a registration.
///
/// Contact details are captured as entered at registration time and are not
/// synchronized with the linked user account afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    pub id: RegistrantId,
    pub registration_id: RegistrationId,
    pub user: Option<UserId>,

    pub name: String,
    pub mail_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,

    pub phone: String,
    email: Option<String>,
    pub groups: String,

    pub position_title: String,
    pub company_name: String,

    cancel_dt: Option<DateTime<Utc>>,
    create_dt: DateTime<Utc>,
    update_dt: DateTime<Utc>,
}

impl Registrant {
    pub fn new(
        id: RegistrantId,
        registration_id: RegistrationId,
        name: impl Into<String>,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            registration_id,
            user: None,
            name: name.into(),
            mail_name: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            country: String::new(),
            phone: String::new(),
            email: email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            groups: String::new(),
            position_title: String::new(),
            company_name: String::new(),
            cancel_dt: None,
            create_dt: now,
            update_dt: now,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn cancel_dt(&self) -> Option<DateTime<Utc>> {
        self.cancel_dt
    }

    pub fn create_dt(&self) -> DateTime<Utc> {
        self.create_dt
    }

    pub fn update_dt(&self) -> DateTime<Utc> {
        self.update_dt
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_dt.is_some()
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.cancel_dt.is_some() {
            return Err(DomainError::conflict("registrant already cancelled"));
        }
        self.cancel_dt = Some(now);
        self.update_dt = now;
        Ok(())
    }

    /// "Last, First" guessed from the free-text name.
    ///
    /// Tokens are read positionally: five are prefix/first/middle/last/suffix,
    /// four first/middle/last/suffix, three first/middle/last, two first/last
    /// and one is just a first name. Any other count keeps the raw name as the
    /// first name. Returns `None` when there is nothing to show.
    pub fn lastname_firstname(&self) -> Option<String> {
        let tokens: Vec<&str> = self.name.split_whitespace().collect();

        let (first, last) = match tokens.as_slice() {
            [_prefix, first, _middle, last, _suffix] => (*first, *last),
            [first, _middle, last, _suffix] => (*first, *last),
            [first, _middle, last] => (*first, *last),
            [first, last] => (*first, *last),
            [first] => (*first, ""),
            _ => (self.name.as_str(), ""),
        };

        match (first.is_empty(), last.is_empty()) {
            (false, false) => Some(format!("{last}, {first}")),
            (false, true) => Some(first.to_string()),
            _ => None,
        }
    }

    /// Stable hex digest identifying this registrant within `event_id`.
    pub fn hash(&self, event_id: EventId) -> String {
        let mut hasher = Md5::new();
        hasher.update(format!("{event_id}.{}", self.email().unwrap_or_default()).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Confirmation link that does not expose the registrant id.
    pub fn hash_url(&self, event_id: EventId) -> String {
        format!("/memberships/applications/{event_id}/{}/", self.hash(event_id))
    }

    pub fn absolute_url(&self, event_id: EventId) -> String {
        format!("/events/{event_id}/registrations/{}/confirmation/", self.id)
    }
}

impl Entity for Registrant {
    type Id = RegistrantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Active (non-cancelled) registrants of `event_id`.
pub fn event_registrants<'a>(
    registrants: &'a [Registrant],
    registrations: &[Registration],
    event_id: EventId,
) -> Vec<&'a Registrant> {
    registrants
        .iter()
        .filter(|r| !r.is_cancelled())
        .filter(|r| {
            registrations
                .iter()
                .any(|reg| reg.id == r.registration_id && reg.event_id == event_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registrant(name: &str, email: Option<&str>) -> Registrant {
        Registrant::new(
            RegistrantId::generate(),
            RegistrationId::generate(),
            name,
            email.map(str::to_string),
            Utc::now(),
        )
    }

    fn display(name: &str) -> Option<String> {
        registrant(name, None).lastname_firstname()
    }

    #[test]
    fn lastname_firstname_by_token_count() {
        assert_eq!(display("Dr. Jane Q. Public III").as_deref(), Some("Public, Jane"));
        assert_eq!(display("Jane Q. Public Jr.").as_deref(), Some("Public, Jane"));
        assert_eq!(display("Jane Quinn Public").as_deref(), Some("Public, Jane"));
        assert_eq!(display("Jane Public").as_deref(), Some("Public, Jane"));
        assert_eq!(display("Jane").as_deref(), Some("Jane"));
    }

    #[test]
    fn lastname_firstname_falls_back_to_raw_name() {
        assert_eq!(display("a b c d e f").as_deref(), Some("a b c d e f"));
        assert_eq!(display("   ").as_deref(), Some("   "));
        assert_eq!(display(""), None);
    }

    #[test]
    fn hash_is_md5_of_event_and_email() {
        let event_id = EventId::generate();
        let r = registrant("Jane Public", Some("jane@example.com"));

        let expected = {
            let mut hasher = Md5::new();
            hasher.update(format!("{event_id}.jane@example.com"));
            hex::encode(hasher.finalize())
        };
        assert_eq!(r.hash(event_id), expected);
        assert_eq!(r.hash(event_id).len(), 32);
        assert_ne!(r.hash(event_id), r.hash(EventId::generate()));
        assert!(r.hash_url(event_id).ends_with(&format!("{expected}/")));
    }

    #[test]
    fn blank_email_is_treated_as_missing() {
        let r = registrant("Jane", Some("  "));
        assert_eq!(r.email(), None);
    }

    #[test]
    fn cancel_is_one_shot() {
        let mut r = registrant("Jane", None);
        let now = Utc::now();
        r.cancel(now).unwrap();
        assert_eq!(r.cancel_dt(), Some(now));
        assert!(matches!(r.cancel(now), Err(DomainError::Conflict(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for two to five tokens the output is "<last>, <first>" built from the input tokens.
        #[test]
        fn comma_form_uses_input_tokens(tokens in prop::collection::vec("[A-Za-z.]{1,12}", 2..=5)) {
            let name = tokens.join(" ");
            let out = display(&name).unwrap();
            let (last, first) = out.split_once(", ").unwrap();
            prop_assert!(tokens.iter().any(|t| t == first));
            prop_assert!(tokens.iter().any(|t| t == last));
        }
    }
}
