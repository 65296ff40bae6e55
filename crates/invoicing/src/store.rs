//! Invoice storage abstraction.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use eventdesk_core::{AggregateRoot, DomainError, ExpectedVersion};

use crate::invoice::{Invoice, InvoiceId, ObjectRef};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invoice store lock poisoned")]
    Poisoned,
}

/// Persistence port for invoices.
///
/// At most one invoice exists per [`ObjectRef`]; `save` enforces it.
pub trait InvoiceStore: Send + Sync {
    fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError>;

    fn find_by_object(&self, object: &ObjectRef) -> Result<Option<Invoice>, StoreError>;

    /// Persist `invoice`, requiring the stored copy (if any) to be at `expected`.
    fn save(&self, invoice: &Invoice, expected: ExpectedVersion) -> Result<(), StoreError>;
}

impl<S> InvoiceStore for Arc<S>
where
    S: InvoiceStore + ?Sized,
{
    fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        (**self).get(id)
    }

    fn find_by_object(&self, object: &ObjectRef) -> Result<Option<Invoice>, StoreError> {
        (**self).find_by_object(object)
    }

    fn save(&self, invoice: &Invoice, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(invoice, expected)
    }
}

#[derive(Debug, Default)]
struct Tables {
    invoices: HashMap<InvoiceId, Invoice>,
    by_object: HashMap<ObjectRef, InvoiceId>,
}

/// In-memory invoice store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    inner: RwLock<Tables>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.invoices.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.invoices.get(&id).cloned())
    }

    fn find_by_object(&self, object: &ObjectRef) -> Result<Option<Invoice>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .by_object
            .get(object)
            .and_then(|id| tables.invoices.get(id))
            .cloned())
    }

    fn save(&self, invoice: &Invoice, expected: ExpectedVersion) -> Result<(), StoreError> {
        let Some(object) = invoice.object().cloned() else {
            return Err(DomainError::invariant("cannot save an invoice that was never issued").into());
        };

        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let id = invoice.id_typed();

        let stored_version = tables.invoices.get(&id).map_or(0, |i| i.version());
        expected.check(stored_version)?;

        if let Some(owner) = tables.by_object.get(&object) {
            if *owner != id {
                return Err(DomainError::conflict(format!(
                    "{} {} already has invoice {owner}",
                    object.object_type, object.object_id
                ))
                .into());
            }
        }

        tables.by_object.insert(object, id);
        tables.invoices.insert(id, invoice.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eventdesk_core::{AggregateId, Money};
    use eventdesk_signals::execute;

    use crate::invoice::{InvoiceCommand, InvoiceTerms, IssueInvoice};

    fn issued(object: ObjectRef) -> Invoice {
        let id = InvoiceId::generate();
        let mut invoice = Invoice::empty(id);
        execute(
            &mut invoice,
            &InvoiceCommand::IssueInvoice(IssueInvoice {
                invoice_id: id,
                object,
                terms: InvoiceTerms {
                    estimate: true,
                    status_detail: "estimate".into(),
                    subtotal: Money::from_cents(500),
                    total: Money::from_cents(500),
                    balance: Money::zero(),
                    due_date: Utc::now(),
                    ship_date: Utc::now(),
                },
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        invoice
    }

    #[test]
    fn find_by_object_returns_saved_invoice() {
        let store = InMemoryInvoiceStore::new();
        let object = ObjectRef::new("event_registration", AggregateId::new());
        let invoice = issued(object.clone());

        store.save(&invoice, ExpectedVersion::Exact(0)).unwrap();

        assert_eq!(store.find_by_object(&object).unwrap(), Some(invoice.clone()));
        assert_eq!(store.get(invoice.id_typed()).unwrap(), Some(invoice));
        assert_eq!(
            store
                .find_by_object(&ObjectRef::new("calendarevents", object.object_id))
                .unwrap(),
            None
        );
    }

    #[test]
    fn second_invoice_for_same_object_conflicts() {
        let store = InMemoryInvoiceStore::new();
        let object = ObjectRef::new("event_registration", AggregateId::new());

        store.save(&issued(object.clone()), ExpectedVersion::Any).unwrap();
        let err = store.save(&issued(object), ExpectedVersion::Any).unwrap_err();

        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stale_version_is_rejected() {
        let store = InMemoryInvoiceStore::new();
        let invoice = issued(ObjectRef::new("event_registration", AggregateId::new()));
        store.save(&invoice, ExpectedVersion::Exact(0)).unwrap();

        let err = store.save(&invoice, ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[test]
    fn unissued_invoice_cannot_be_saved() {
        let store = InMemoryInvoiceStore::new();
        let err = store
            .save(&Invoice::empty(InvoiceId::generate()), ExpectedVersion::Any)
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InvariantViolation(_))));
        assert!(store.is_empty());
    }
}
