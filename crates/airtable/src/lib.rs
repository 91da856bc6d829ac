//! Airtable access layer for the quotation widget.
//!
//! - **Client** (`client`) - authenticated HTTP calls, status
//!   classification, filter-formula builder, bounded transport retry
//! - **Backend seam** (`backend`) - `TableBackend` trait the services
//!   depend on; `mock` carries the in-memory implementation
//! - **Directories** (`directory`) - read-only client/advisor lookups
//! - **Outbox** (`outbox`) - validated quotation write
//!
//! Services are constructed with an explicit `Arc<dyn TableBackend>`;
//! there are no module-level singletons.

use std::sync::Arc;

pub mod backend;
pub mod client;
pub mod directory;
pub mod error;
pub mod mock;
pub mod outbox;

pub use backend::{Record, RecordPage, RecordQuery, TableBackend};
pub use client::{filter_formula, AirtableClient, FilterOperator};
pub use directory::{AdvisorDirectory, ClientDirectory};
pub use error::BackendError;
pub use mock::MockBackend;
pub use outbox::{QuotationOutbox, SubmitFailure, SubmitFailureKind, SubmitReceipt};

/// The full service set wired to one backend. Composition root for the
/// widget host; tests swap in a [`MockBackend`] here.
#[derive(Clone)]
pub struct Services {
    pub clients: ClientDirectory,
    pub advisors: AdvisorDirectory,
    pub quotations: QuotationOutbox,
}

impl Services {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self {
            clients: ClientDirectory::new(backend.clone()),
            advisors: AdvisorDirectory::new(backend.clone()),
            quotations: QuotationOutbox::new(backend),
        }
    }
}
