//! Event registration: pricing tiers, registrants, registrations, payment.
//!
//! The heart of the crate is the pricing evaluator in [`pricing`]: given a
//! [`RegistrationConfiguration`], the owning event and an explicit "now", it
//! decides whether registration is open and what it costs. Everything else is
//! the record keeping around a completed registration.

pub mod configuration;
pub mod desk;
pub mod payment;
pub mod pricing;
pub mod registrant;
pub mod registration;
pub mod settings;

pub use configuration::{
    ConfigureRegistration, RegistrationConfiguration, RegistrationConfigurationCommand,
    RegistrationConfigurationEvent, RegistrationConfigurationId, RegistrationConfigured,
    RegistrationEnabledChanged, RegistrationSettingsUpdated, SetRegistrationEnabled,
    UpdateRegistrationSettings,
};
pub use desk::{
    CompletedRegistration, DeskError, Quote, RegistrantInput, RegistrationCompleted, RegistrationDesk,
    RegistrationEvent, RegistrationRequest,
};
pub use payment::{Payment, PaymentId, PaymentMethod, PaymentMethodId};
pub use pricing::{PricingSchedule, PricingTier, RegistrationWindow, TierWindow};
pub use registrant::{Registrant, RegistrantId, event_registrants};
pub use registration::{INVOICE_OBJECT_TYPE, Registration, RegistrationId, is_registrant};
pub use settings::RegistrationSettings;
