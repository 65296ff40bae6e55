use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, DomainResult, Entity};

use crate::registration::RegistrationId;

eventdesk_core::typed_id!(PaymentMethodId);
eventdesk_core::typed_id!(PaymentId);

const MAX_LABEL_LEN: usize = 50;

/// A way of paying for a registration ("Credit Card", "Cash", "Check").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    label: String,
}

impl PaymentMethod {
    pub fn new(id: PaymentMethodId, label: impl Into<String>) -> DomainResult<Self> {
        let label = label.into().trim().to_string();
        if label.is_empty() {
            return Err(DomainError::validation("payment method label cannot be empty"));
        }
        if label.chars().count() > MAX_LABEL_LEN {
            return Err(DomainError::validation(format!(
                "payment method label cannot exceed {MAX_LABEL_LEN} characters"
            )));
        }
        Ok(Self { id, label })
    }

    /// The methods every site starts with.
    pub fn defaults() -> Vec<PaymentMethod> {
        ["Credit Card", "Cash", "Check"]
            .into_iter()
            .map(|label| PaymentMethod {
                id: PaymentMethodId::generate(),
                label: label.to_string(),
            })
            .collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.label)
    }
}

impl Entity for PaymentMethod {
    type Id = PaymentMethodId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payment record of a registration (one per registration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub registration_id: RegistrationId,
}

impl Payment {
    pub fn for_registration(registration_id: RegistrationId) -> Self {
        Self {
            id: PaymentId::generate(),
            registration_id,
        }
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
