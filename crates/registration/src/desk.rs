//! Registration checkout: quote a price, then record a registration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use eventdesk_calendar::{Event as CalendarEvent, EventId};
use eventdesk_core::{DomainError, Money, UserId};
use eventdesk_invoicing::{Invoice, InvoiceStore, StoreError};
use eventdesk_signals::{Event, EventBus, EventEnvelope};

use crate::configuration::RegistrationConfiguration;
use crate::payment::PaymentMethodId;
use crate::pricing::PricingTier;
use crate::registrant::{Registrant, RegistrantId};
use crate::registration::{Registration, RegistrationId};
use crate::settings::RegistrationSettings;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("registration configuration does not belong to event {0}")]
    NotAttached(EventId),

    #[error("registration is closed")]
    Closed,

    #[error("registration is full ({limit} seats)")]
    Full { limit: u32 },

    #[error("payment method {0} is not accepted for this event")]
    UnsupportedPaymentMethod(PaymentMethodId),

    #[error("a registration needs at least one registrant")]
    NoRegistrants,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to publish registration event: {0}")]
    Publish(String),
}

/// Price a registrant would pay right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub tier: Option<PricingTier>,
    pub price: Money,
    /// Seats left; `None` when unlimited.
    pub remaining: Option<usize>,
}

/// Attendee details as entered on the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantInput {
    pub name: String,
    pub email: Option<String>,
    pub user: Option<UserId>,
    pub phone: String,
    pub company_name: String,
    pub position_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub registrants: Vec<RegistrantInput>,
    pub payment_method: Option<PaymentMethodId>,
    pub creator: Option<UserId>,
    pub note: String,
}

/// Event: RegistrationCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCompleted {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub registrant_count: usize,
    pub tier: Option<PricingTier>,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationEvent {
    RegistrationCompleted(RegistrationCompleted),
}

impl Event for RegistrationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RegistrationEvent::RegistrationCompleted(_) => "registration.registration.completed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RegistrationEvent::RegistrationCompleted(e) => e.occurred_at,
        }
    }
}

/// `price` for each of `count` registrants.
fn bill(price: Money, count: usize) -> Result<Money, DomainError> {
    let total = price
        .amount()
        .checked_mul(Decimal::from(count as u64))
        .ok_or_else(|| DomainError::validation(format!("registration total overflows ({count} x {price})")))?;
    Money::new(total)
}

/// What a successful [`RegistrationDesk::register`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRegistration {
    pub registration: Registration,
    pub registrants: Vec<Registrant>,
    pub invoice: Invoice,
}

/// Front desk of an event: quotes prices and records registrations.
#[derive(Debug)]
pub struct RegistrationDesk<S, B> {
    invoices: S,
    bus: B,
    settings: RegistrationSettings,
}

impl<S, B> RegistrationDesk<S, B>
where
    S: InvoiceStore,
    B: EventBus<EventEnvelope<RegistrationEvent>>,
{
    pub fn new(invoices: S, bus: B, settings: RegistrationSettings) -> Self {
        Self {
            invoices,
            bus,
            settings,
        }
    }

    pub fn invoices(&self) -> &S {
        &self.invoices
    }

    fn ensure_attached(config: &RegistrationConfiguration, event: &CalendarEvent) -> Result<(), DeskError> {
        if event.registration_configuration() != Some(config.id_typed().0) {
            return Err(DeskError::NotAttached(event.id_typed()));
        }
        Ok(())
    }

    /// Quote for one more registrant, given `registered` active registrants.
    pub fn quote(
        &self,
        config: &RegistrationConfiguration,
        event: &CalendarEvent,
        registered: usize,
        now: DateTime<Utc>,
    ) -> Result<Quote, DeskError> {
        Self::ensure_attached(config, event)?;

        if !config.available(Some(event), now) || !config.is_open(Some(event), now) {
            return Err(DeskError::Closed);
        }
        if !config.has_capacity(registered) {
            return Err(DeskError::Full {
                limit: config.limit(),
            });
        }

        let tier = config
            .schedule()
            .active_tier(event.end_dt(), now)
            .map(|t| t.tier);

        Ok(Quote {
            tier,
            price: config.current_price(Some(event), now),
            remaining: config.remaining_capacity(registered),
        })
    }

    /// Record a registration for every attendee in `request`.
    ///
    /// Each registrant pays the current tier price. The registration's invoice
    /// is saved and a `RegistrationCompleted` event is published.
    pub fn register(
        &self,
        config: &RegistrationConfiguration,
        event: &CalendarEvent,
        registered: usize,
        request: RegistrationRequest,
        now: DateTime<Utc>,
    ) -> Result<CompletedRegistration, DeskError> {
        if request.registrants.is_empty() {
            return Err(DeskError::NoRegistrants);
        }

        let quote = match self.quote(config, event, registered, now) {
            Ok(q) => q,
            Err(err) => {
                warn!(event_id = %event.id_typed(), error = %err, "registration refused");
                return Err(err);
            }
        };

        let count = request.registrants.len();
        if let Some(remaining) = quote.remaining {
            if count > remaining {
                warn!(event_id = %event.id_typed(), requested = count, remaining, "registration exceeds capacity");
                return Err(DeskError::Full {
                    limit: config.limit(),
                });
            }
        }

        if let Some(method) = request.payment_method {
            if !config.accepts(method) {
                return Err(DeskError::UnsupportedPaymentMethod(method));
            }
        }

        let amount = bill(quote.price, count)?;

        let mut registration = Registration::new(RegistrationId::generate(), event.id_typed(), amount, now);
        registration.payment_method = request.payment_method;
        registration.creator = request.creator;
        registration.owner = request.creator;
        registration.note = request.note;

        let registrants: Vec<Registrant> = request
            .registrants
            .into_iter()
            .map(|input| {
                let mut r = Registrant::new(
                    RegistrantId::generate(),
                    registration.id,
                    input.name,
                    input.email,
                    now,
                );
                r.user = input.user;
                r.phone = input.phone;
                r.company_name = input.company_name;
                r.position_title = input.position_title;
                r
            })
            .collect();

        let invoice = registration.save_invoice(&self.invoices, &self.settings.invoice_status_detail, now)?;

        let completed = RegistrationEvent::RegistrationCompleted(RegistrationCompleted {
            registration_id: registration.id,
            event_id: event.id_typed(),
            registrant_count: count,
            tier: quote.tier,
            amount,
            occurred_at: now,
        });
        for envelope in EventEnvelope::wrap_all(registration.id.0, "registration", 1, vec![completed]) {
            self.bus
                .publish(envelope)
                .map_err(|e| DeskError::Publish(format!("{e:?}")))?;
        }

        info!(
            registration_id = %registration.id,
            event_id = %event.id_typed(),
            registrants = count,
            amount = %amount,
            "registration completed"
        );

        Ok(CompletedRegistration {
            registration,
            registrants,
            invoice,
        })
    }
}
