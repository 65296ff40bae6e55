use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{Aggregate, AggregateRoot, DomainError, DomainResult, Money};
use eventdesk_signals::{Event, execute};

use crate::payment::PaymentMethodId;
use crate::pricing::{self, PricingSchedule, RegistrationWindow};

eventdesk_core::typed_id!(
    /// Registration configuration identifier.
    RegistrationConfigurationId
);

/// Aggregate root: the registration settings of one event.
///
/// Owned one-to-one by a calendar event, which records this configuration's id.
/// Pricing queries take that event explicitly; see [`crate::pricing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfiguration {
    id: RegistrationConfigurationId,
    schedule: PricingSchedule,
    /// Maximum number of registrants; 0 means unlimited.
    limit: u32,
    enabled: bool,
    payment_methods: Vec<PaymentMethodId>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl RegistrationConfiguration {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: RegistrationConfigurationId) -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            id,
            schedule: PricingSchedule {
                early_dt: epoch,
                regular_dt: epoch,
                late_dt: epoch,
                early_price: Money::zero(),
                regular_price: Money::zero(),
                late_price: Money::zero(),
            },
            limit: 0,
            enabled: false,
            payment_methods: Vec::new(),
            created_at: None,
            updated_at: None,
            version: 0,
            created: false,
        }
    }

    /// Build a configuration by running `ConfigureRegistration` on an empty one.
    pub fn configured(
        id: RegistrationConfigurationId,
        schedule: PricingSchedule,
        limit: u32,
        enabled: bool,
        payment_methods: Vec<PaymentMethodId>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut config = Self::empty(id);
        execute(
            &mut config,
            &RegistrationConfigurationCommand::ConfigureRegistration(ConfigureRegistration {
                configuration_id: id,
                schedule,
                limit,
                enabled,
                payment_methods,
                occurred_at,
            }),
        )?;
        Ok(config)
    }

    pub fn id_typed(&self) -> RegistrationConfigurationId {
        self.id
    }

    pub fn schedule(&self) -> &PricingSchedule {
        &self.schedule
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn payment_methods(&self) -> &[PaymentMethodId] {
        &self.payment_methods
    }

    pub fn accepts(&self, method: PaymentMethodId) -> bool {
        self.payment_methods.contains(&method)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Whether one more registrant fits, given `registered` so far.
    pub fn has_capacity(&self, registered: usize) -> bool {
        self.limit == 0 || registered < self.limit as usize
    }

    /// Seats left; `None` when unlimited.
    pub fn remaining_capacity(&self, registered: usize) -> Option<usize> {
        (self.limit != 0).then(|| (self.limit as usize).saturating_sub(registered))
    }

    pub fn is_open<W>(&self, event: Option<&W>, now: DateTime<Utc>) -> bool
    where
        W: RegistrationWindow + ?Sized,
    {
        pricing::is_open(self, event, now)
    }

    pub fn within_time<W>(&self, event: Option<&W>, now: DateTime<Utc>) -> bool
    where
        W: RegistrationWindow + ?Sized,
    {
        pricing::within_time(self, event, now)
    }

    pub fn current_price<W>(&self, event: Option<&W>, now: DateTime<Utc>) -> Money
    where
        W: RegistrationWindow + ?Sized,
    {
        pricing::current_price(self, event, now)
    }

    pub fn price_for_tier(&self, tier_name: &str) -> Option<Money> {
        pricing::price_for_tier(self, tier_name)
    }

    pub fn available<W>(&self, event: Option<&W>, now: DateTime<Utc>) -> bool
    where
        W: RegistrationWindow + ?Sized,
    {
        pricing::available(self, event, now)
    }
}

impl AggregateRoot for RegistrationConfiguration {
    type Id = RegistrationConfigurationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ConfigureRegistration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureRegistration {
    pub configuration_id: RegistrationConfigurationId,
    pub schedule: PricingSchedule,
    pub limit: u32,
    pub enabled: bool,
    pub payment_methods: Vec<PaymentMethodId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateRegistrationSettings (dates, prices, capacity, payment methods).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRegistrationSettings {
    pub configuration_id: RegistrationConfigurationId,
    pub schedule: PricingSchedule,
    pub limit: u32,
    pub payment_methods: Vec<PaymentMethodId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetRegistrationEnabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRegistrationEnabled {
    pub configuration_id: RegistrationConfigurationId,
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationConfigurationCommand {
    ConfigureRegistration(ConfigureRegistration),
    UpdateRegistrationSettings(UpdateRegistrationSettings),
    SetRegistrationEnabled(SetRegistrationEnabled),
}

/// Event: RegistrationConfigured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationConfigured {
    pub configuration_id: RegistrationConfigurationId,
    pub schedule: PricingSchedule,
    pub limit: u32,
    pub enabled: bool,
    pub payment_methods: Vec<PaymentMethodId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RegistrationSettingsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSettingsUpdated {
    pub configuration_id: RegistrationConfigurationId,
    pub schedule: PricingSchedule,
    pub limit: u32,
    pub payment_methods: Vec<PaymentMethodId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RegistrationEnabledChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEnabledChanged {
    pub configuration_id: RegistrationConfigurationId,
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationConfigurationEvent {
    RegistrationConfigured(RegistrationConfigured),
    RegistrationSettingsUpdated(RegistrationSettingsUpdated),
    RegistrationEnabledChanged(RegistrationEnabledChanged),
}

impl Event for RegistrationConfigurationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::RegistrationConfigured(_) => "registration.configuration.configured",
            Self::RegistrationSettingsUpdated(_) => "registration.configuration.settings_updated",
            Self::RegistrationEnabledChanged(_) => "registration.configuration.enabled_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::RegistrationConfigured(e) => e.occurred_at,
            Self::RegistrationSettingsUpdated(e) => e.occurred_at,
            Self::RegistrationEnabledChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for RegistrationConfiguration {
    type Command = RegistrationConfigurationCommand;
    type Event = RegistrationConfigurationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RegistrationConfigurationEvent::RegistrationConfigured(e) => {
                self.id = e.configuration_id;
                self.schedule = e.schedule.clone();
                self.limit = e.limit;
                self.enabled = e.enabled;
                self.payment_methods = e.payment_methods.clone();
                self.created_at = Some(e.occurred_at);
                self.updated_at = Some(e.occurred_at);
                self.created = true;
            }
            RegistrationConfigurationEvent::RegistrationSettingsUpdated(e) => {
                self.schedule = e.schedule.clone();
                self.limit = e.limit;
                self.payment_methods = e.payment_methods.clone();
                self.updated_at = Some(e.occurred_at);
            }
            RegistrationConfigurationEvent::RegistrationEnabledChanged(e) => {
                self.enabled = e.enabled;
                self.updated_at = Some(e.occurred_at);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RegistrationConfigurationCommand::ConfigureRegistration(cmd) => self.handle_configure(cmd),
            RegistrationConfigurationCommand::UpdateRegistrationSettings(cmd) => self.handle_update(cmd),
            RegistrationConfigurationCommand::SetRegistrationEnabled(cmd) => self.handle_set_enabled(cmd),
        }
    }
}

fn dedup_methods(methods: &[PaymentMethodId]) -> Vec<PaymentMethodId> {
    let mut out = Vec::with_capacity(methods.len());
    for m in methods {
        if !out.contains(m) {
            out.push(*m);
        }
    }
    out
}

impl RegistrationConfiguration {
    fn ensure_existing(&self, id: RegistrationConfigurationId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != id {
            return Err(DomainError::invariant("configuration_id mismatch"));
        }
        Ok(())
    }

    fn handle_configure(
        &self,
        cmd: &ConfigureRegistration,
    ) -> Result<Vec<RegistrationConfigurationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("registration configuration already exists"));
        }
        cmd.schedule.validate()?;

        Ok(vec![RegistrationConfigurationEvent::RegistrationConfigured(
            RegistrationConfigured {
                configuration_id: cmd.configuration_id,
                schedule: cmd.schedule.clone(),
                limit: cmd.limit,
                enabled: cmd.enabled,
                payment_methods: dedup_methods(&cmd.payment_methods),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_update(
        &self,
        cmd: &UpdateRegistrationSettings,
    ) -> Result<Vec<RegistrationConfigurationEvent>, DomainError> {
        self.ensure_existing(cmd.configuration_id)?;
        cmd.schedule.validate()?;

        Ok(vec![RegistrationConfigurationEvent::RegistrationSettingsUpdated(
            RegistrationSettingsUpdated {
                configuration_id: cmd.configuration_id,
                schedule: cmd.schedule.clone(),
                limit: cmd.limit,
                payment_methods: dedup_methods(&cmd.payment_methods),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_set_enabled(
        &self,
        cmd: &SetRegistrationEnabled,
    ) -> Result<Vec<RegistrationConfigurationEvent>, DomainError> {
        self.ensure_existing(cmd.configuration_id)?;

        if self.enabled == cmd.enabled {
            return Ok(vec![]);
        }

        Ok(vec![RegistrationConfigurationEvent::RegistrationEnabledChanged(
            RegistrationEnabledChanged {
                configuration_id: cmd.configuration_id,
                enabled: cmd.enabled,
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}
