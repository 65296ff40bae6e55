//! Invoicing domain module.
//!
//! Invoices are attached to arbitrary billable records through an
//! [`ObjectRef`] (object type tag + record id). Event registrations are the
//! main client: each registration owns at most one invoice, created on first
//! save and revised afterwards.

pub mod invoice;
pub mod store;
pub mod upsert;

pub use invoice::{
    Invoice, InvoiceCommand, InvoiceEvent, InvoiceId, InvoiceIssued, InvoiceRevised,
    InvoiceStatus, InvoiceTerms, InvoiceVoided, IssueInvoice, ObjectRef, ReviseInvoice,
    VoidInvoice,
};
pub use store::{InMemoryInvoiceStore, InvoiceStore, StoreError};
pub use upsert::save_invoice_for;
