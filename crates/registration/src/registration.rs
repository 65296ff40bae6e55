use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use eventdesk_calendar::EventId;
use eventdesk_core::{Entity, Money, UserId};
use eventdesk_invoicing::{
    Invoice, InvoiceId, InvoiceStore, InvoiceTerms, ObjectRef, StoreError, save_invoice_for,
};

use crate::payment::PaymentMethodId;
use crate::registrant::Registrant;

eventdesk_core::typed_id!(
    /// Registration identifier.
    RegistrationId
);

/// Object type tag under which registration invoices are filed.
pub const INVOICE_OBJECT_TYPE: &str = "event_registration";

/// A completed sign-up for an event, covering one or more registrants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub guid: Uuid,
    pub event_id: EventId,

    pub reminder: bool,
    pub note: String,

    invoice_id: Option<InvoiceId>,
    pub payment_method: Option<PaymentMethodId>,
    pub amount_paid: Money,

    pub creator: Option<UserId>,
    pub owner: Option<UserId>,
    create_dt: DateTime<Utc>,
    update_dt: DateTime<Utc>,
}

impl Registration {
    pub fn new(id: RegistrationId, event_id: EventId, amount_paid: Money, now: DateTime<Utc>) -> Self {
        Self {
            id,
            guid: Uuid::now_v7(),
            event_id,
            reminder: false,
            note: String::new(),
            invoice_id: None,
            payment_method: None,
            amount_paid,
            creator: None,
            owner: None,
            create_dt: now,
            update_dt: now,
        }
    }

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.invoice_id
    }

    pub fn create_dt(&self) -> DateTime<Utc> {
        self.create_dt
    }

    pub fn update_dt(&self) -> DateTime<Utc> {
        self.update_dt
    }

    /// The first registrant of this registration (in insertion order) with an email.
    pub fn primary_registrant<'a>(&self, registrants: &'a [Registrant]) -> Option<&'a Registrant> {
        registrants
            .iter()
            .find(|r| r.registration_id == self.id && r.email().is_some())
    }

    /// Key of this registration's invoice.
    pub fn invoice_object(&self) -> ObjectRef {
        ObjectRef::new(INVOICE_OBJECT_TYPE, self.id.0)
    }

    /// Create or update the invoice of this registration and link it.
    ///
    /// The invoice is an estimate billing `amount_paid` with nothing outstanding,
    /// due and shipped at `now`.
    pub fn save_invoice<S>(
        &mut self,
        store: &S,
        status_detail: &str,
        now: DateTime<Utc>,
    ) -> Result<Invoice, StoreError>
    where
        S: InvoiceStore + ?Sized,
    {
        let terms = InvoiceTerms {
            estimate: true,
            status_detail: status_detail.to_string(),
            subtotal: self.amount_paid,
            total: self.amount_paid,
            balance: Money::zero(),
            due_date: now,
            ship_date: now,
        };

        let invoice = save_invoice_for(store, &self.invoice_object(), terms, now)?;
        self.invoice_id = Some(invoice.id_typed());
        self.update_dt = now;
        debug!(registration_id = %self.id, invoice_id = %invoice.id_typed(), "registration invoice saved");
        Ok(invoice)
    }
}

impl Entity for Registration {
    type Id = RegistrationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Whether `user` is a registrant of any registration for `event_id`.
pub fn is_registrant(
    event_id: EventId,
    registrations: &[Registration],
    registrants: &[Registrant],
    user: UserId,
) -> bool {
    registrations
        .iter()
        .filter(|reg| reg.event_id == event_id)
        .any(|reg| {
            registrants
                .iter()
                .any(|r| r.registration_id == reg.id && r.user == Some(user))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventdesk_core::AggregateRoot;
    use eventdesk_invoicing::InMemoryInvoiceStore;

    use crate::registrant::{RegistrantId, event_registrants};

    fn registrant(reg: &Registration, name: &str, email: Option<&str>) -> Registrant {
        Registrant::new(
            RegistrantId::generate(),
            reg.id,
            name,
            email.map(str::to_string),
            Utc::now(),
        )
    }

    #[test]
    fn primary_registrant_is_first_with_email() {
        let reg = Registration::new(RegistrationId::generate(), EventId::generate(), Money::zero(), Utc::now());
        let other = Registration::new(RegistrationId::generate(), reg.event_id, Money::zero(), Utc::now());
        let registrants = vec![
            registrant(&other, "Elsewhere", Some("other@example.com")),
            registrant(&reg, "No Mail", None),
            registrant(&reg, "First Mail", Some("first@example.com")),
            registrant(&reg, "Second Mail", Some("second@example.com")),
        ];

        let primary = reg.primary_registrant(&registrants).unwrap();
        assert_eq!(primary.name, "First Mail");

        let empty = Registration::new(RegistrationId::generate(), reg.event_id, Money::zero(), Utc::now());
        assert!(empty.primary_registrant(&registrants).is_none());
    }

    #[test]
    fn save_invoice_is_idempotent_per_registration() {
        let store = InMemoryInvoiceStore::new();
        let now = Utc::now();
        let mut reg = Registration::new(RegistrationId::generate(), EventId::generate(), Money::from_cents(2000), now);

        let first = reg.save_invoice(&store, "estimate", now).unwrap();
        assert_eq!(reg.invoice_id(), Some(first.id_typed()));
        assert_eq!(first.total(), Money::from_cents(2000));
        assert_eq!(first.balance(), Money::zero());
        assert!(first.is_estimate());

        reg.amount_paid = Money::from_cents(3000);
        let second = reg.save_invoice(&store, "tendered", now).unwrap();

        assert_eq!(second.id_typed(), first.id_typed());
        assert_eq!(second.version(), 2);
        assert_eq!(second.total(), Money::from_cents(3000));
        assert_eq!(second.terms().unwrap().status_detail, "tendered");
        assert_eq!(store.len(), 1);
        assert_eq!(
            second.object().unwrap(),
            &ObjectRef::new(INVOICE_OBJECT_TYPE, reg.id.0)
        );
    }

    #[test]
    fn registrant_membership_queries() {
        let event = EventId::generate();
        let user = UserId::new();
        let reg = Registration::new(RegistrationId::generate(), event, Money::zero(), Utc::now());
        let elsewhere = Registration::new(RegistrationId::generate(), EventId::generate(), Money::zero(), Utc::now());

        let mut linked = registrant(&reg, "Linked", Some("l@example.com"));
        linked.user = Some(user);
        let mut cancelled = registrant(&reg, "Gone", None);
        cancelled.cancel(Utc::now()).unwrap();
        let foreign = registrant(&elsewhere, "Foreign", None);

        let registrants = vec![linked, cancelled, foreign];
        let registrations = vec![reg, elsewhere];

        let active: Vec<&str> = event_registrants(&registrants, &registrations, event)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(active, vec!["Linked"]);

        assert!(is_registrant(event, &registrations, &registrants, user));
        assert!(!is_registrant(event, &registrations, &registrants, UserId::new()));
        assert!(!is_registrant(registrations[1].event_id, &registrations, &registrants, user));
    }
}
