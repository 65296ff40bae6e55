use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Money};
use eventdesk_signals::Event;

eventdesk_core::typed_id!(
    /// Invoice identifier.
    InvoiceId
);

/// The billable record an invoice belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Fixed tag naming the kind of record (e.g. "event_registration").
    pub object_type: String,
    pub object_id: AggregateId,
}

impl ObjectRef {
    pub fn new(object_type: impl Into<String>, object_id: AggregateId) -> Self {
        Self {
            object_type: object_type.into(),
            object_id,
        }
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    Void,
}

/// Amounts, dates and flags an invoice is issued or revised with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTerms {
    /// Estimates are not yet payable.
    pub estimate: bool,
    /// Free-form workflow state ("estimate", "tendered", ...).
    pub status_detail: String,
    pub subtotal: Money,
    pub total: Money,
    pub balance: Money,
    pub due_date: DateTime<Utc>,
    pub ship_date: DateTime<Utc>,
}

impl InvoiceTerms {
    fn validate(&self) -> Result<(), DomainError> {
        if self.status_detail.trim().is_empty() {
            return Err(DomainError::validation("status_detail cannot be empty"));
        }
        if self.balance > self.total {
            return Err(DomainError::validation("balance cannot exceed total"));
        }
        Ok(())
    }
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    object: Option<ObjectRef>,
    status: InvoiceStatus,
    terms: Option<InvoiceTerms>,
    void_reason: Option<String>,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            object: None,
            status: InvoiceStatus::Open,
            terms: None,
            void_reason: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn terms(&self) -> Option<&InvoiceTerms> {
        self.terms.as_ref()
    }

    pub fn total(&self) -> Money {
        self.terms.as_ref().map(|t| t.total).unwrap_or_default()
    }

    pub fn balance(&self) -> Money {
        self.terms.as_ref().map(|t| t.balance).unwrap_or_default()
    }

    pub fn is_estimate(&self) -> bool {
        self.terms.as_ref().is_some_and(|t| t.estimate)
    }

    pub fn void_reason(&self) -> Option<&str> {
        self.void_reason.as_deref()
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_id: InvoiceId,
    pub object: ObjectRef,
    pub terms: InvoiceTerms,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReviseInvoice (replace the terms of an existing invoice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseInvoice {
    pub invoice_id: InvoiceId,
    pub terms: InvoiceTerms,
    pub occurred_at: DateTime<Utc>,
}

/// Command: VoidInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidInvoice {
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    IssueInvoice(IssueInvoice),
    ReviseInvoice(ReviseInvoice),
    VoidInvoice(VoidInvoice),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub invoice_id: InvoiceId,
    pub object: ObjectRef,
    pub terms: InvoiceTerms,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRevised {
    pub invoice_id: InvoiceId,
    pub terms: InvoiceTerms,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceVoided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceVoided {
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoiceRevised(InvoiceRevised),
    InvoiceVoided(InvoiceVoided),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceIssued(_) => "invoicing.invoice.issued",
            InvoiceEvent::InvoiceRevised(_) => "invoicing.invoice.revised",
            InvoiceEvent::InvoiceVoided(_) => "invoicing.invoice.voided",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceIssued(e) => e.occurred_at,
            InvoiceEvent::InvoiceRevised(e) => e.occurred_at,
            InvoiceEvent::InvoiceVoided(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceIssued(e) => {
                self.id = e.invoice_id;
                self.object = Some(e.object.clone());
                self.terms = Some(e.terms.clone());
                self.status = InvoiceStatus::Open;
                self.created = true;
            }
            InvoiceEvent::InvoiceRevised(e) => {
                self.terms = Some(e.terms.clone());
            }
            InvoiceEvent::InvoiceVoided(e) => {
                self.status = InvoiceStatus::Void;
                self.void_reason = e.reason.clone();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            InvoiceCommand::ReviseInvoice(cmd) => self.handle_revise(cmd),
            InvoiceCommand::VoidInvoice(cmd) => self.handle_void(cmd),
        }
    }
}

impl Invoice {
    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }
        if cmd.object.object_type.trim().is_empty() {
            return Err(DomainError::validation("object_type cannot be empty"));
        }
        cmd.terms.validate()?;

        Ok(vec![InvoiceEvent::InvoiceIssued(InvoiceIssued {
            invoice_id: cmd.invoice_id,
            object: cmd.object.clone(),
            terms: cmd.terms.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise(&self, cmd: &ReviseInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status == InvoiceStatus::Void {
            return Err(DomainError::invariant("cannot revise a void invoice"));
        }
        cmd.terms.validate()?;

        Ok(vec![InvoiceEvent::InvoiceRevised(InvoiceRevised {
            invoice_id: cmd.invoice_id,
            terms: cmd.terms.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_void(&self, cmd: &VoidInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status == InvoiceStatus::Void {
            return Err(DomainError::conflict("invoice is already void"));
        }

        Ok(vec![InvoiceEvent::InvoiceVoided(InvoiceVoided {
            invoice_id: cmd.invoice_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
