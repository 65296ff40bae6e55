use std::env;

/// Overrides the `status_detail` of registration invoices.
pub const INVOICE_STATUS_VAR: &str = "EVENTDESK_INVOICE_STATUS";

/// Registration workflow settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSettings {
    pub invoice_status_detail: String,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            invoice_status_detail: "estimate".to_string(),
        }
    }
}

impl RegistrationSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            invoice_status_detail: env::var(INVOICE_STATUS_VAR)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.invoice_status_detail),
        }
    }
}
