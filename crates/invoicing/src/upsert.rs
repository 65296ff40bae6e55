//! Create-or-update of the single invoice attached to a billable record.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use eventdesk_core::{AggregateRoot, ExpectedVersion};
use eventdesk_signals::execute;

use crate::invoice::{
    Invoice, InvoiceCommand, InvoiceId, InvoiceTerms, IssueInvoice, ObjectRef, ReviseInvoice,
};
use crate::store::{InvoiceStore, StoreError};

/// Save `terms` as the invoice of `object`.
///
/// Revises the invoice already filed under `object`, or issues a new one when
/// none exists. Calling it repeatedly never creates a second invoice.
pub fn save_invoice_for<S>(
    store: &S,
    object: &ObjectRef,
    terms: InvoiceTerms,
    now: DateTime<Utc>,
) -> Result<Invoice, StoreError>
where
    S: InvoiceStore + ?Sized,
{
    match store.find_by_object(object)? {
        Some(mut invoice) => {
            let expected = ExpectedVersion::Exact(invoice.version());
            let invoice_id = invoice.id_typed();
            execute(
                &mut invoice,
                &InvoiceCommand::ReviseInvoice(ReviseInvoice {
                    invoice_id,
                    terms,
                    occurred_at: now,
                }),
            )?;
            store.save(&invoice, expected)?;
            debug!(%invoice_id, object_type = %object.object_type, object_id = %object.object_id, "invoice revised");
            Ok(invoice)
        }
        None => {
            let invoice_id = InvoiceId::generate();
            let mut invoice = Invoice::empty(invoice_id);
            execute(
                &mut invoice,
                &InvoiceCommand::IssueInvoice(IssueInvoice {
                    invoice_id,
                    object: object.clone(),
                    terms,
                    occurred_at: now,
                }),
            )?;
            store.save(&invoice, ExpectedVersion::Exact(0))?;
            info!(%invoice_id, object_type = %object.object_type, object_id = %object.object_id, "invoice issued");
            Ok(invoice)
        }
    }
}
