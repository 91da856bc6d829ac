//! Validated quotation write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cotizador_core::config::AirtableTable;
use cotizador_core::payload::build_quotation_payload;
use cotizador_core::{authoritative_validate, QuotationDraft};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::TableBackend;
use crate::error::BackendError;

/// Distinguishes a draft that never left the widget from one the backend
/// rejected. Both travel the same channel to the modal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitFailureKind {
    Validation,
    Backend,
}

/// Structured submit failure, rendered by the error modal. `details`
/// names the offending field for validation failures.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct SubmitFailure {
    pub kind: SubmitFailureKind,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitReceipt {
    pub message: String,
    pub response: Value,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct QuotationOutbox {
    backend: Arc<dyn TableBackend>,
}

impl QuotationOutbox {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    /// Validates the draft and issues exactly one write.
    ///
    /// Validation failures surface the first missing field/condition and
    /// never reach the network. The write itself is never retried here;
    /// retry is a user action on the failure modal.
    pub async fn send_quotation(
        &self,
        draft: &QuotationDraft,
    ) -> Result<SubmitReceipt, SubmitFailure> {
        if let Err(errors) = authoritative_validate(draft) {
            let first = &errors[0];
            warn!(
                event_name = "quotation.validation_failed",
                id_cliente = %draft.id_cliente,
                role = %draft.solicitud_por,
                field = %first.field,
                "quotation draft failed validation"
            );
            return Err(SubmitFailure {
                kind: SubmitFailureKind::Validation,
                message: first.message.clone(),
                details: Some(first.field.clone()),
            });
        }

        let payload = build_quotation_payload(draft);

        match self.backend.create(AirtableTable::Quotations, &payload).await {
            Ok(response) => {
                info!(
                    event_name = "quotation.submitted",
                    id_cliente = %draft.id_cliente,
                    role = %draft.solicitud_por,
                    products = draft.productos.len(),
                    "quotation submitted"
                );
                Ok(SubmitReceipt {
                    message: "quotation submitted".to_string(),
                    response,
                    submitted_at: Utc::now(),
                })
            }
            Err(error) => {
                warn!(
                    event_name = "quotation.write_failed",
                    id_cliente = %draft.id_cliente,
                    role = %draft.solicitud_por,
                    error = %error,
                    "quotation write failed"
                );
                Err(SubmitFailure {
                    kind: SubmitFailureKind::Backend,
                    message: error.to_string(),
                    details: backend_details(&error),
                })
            }
        }
    }
}

fn backend_details(error: &BackendError) -> Option<String> {
    match error {
        BackendError::InvalidInput { message } => Some(message.clone()),
        BackendError::Server { status, message } => Some(format!("status {status}: {message}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cotizador_core::{ProductLine, QuotationDraft, Role};

    use super::{QuotationOutbox, SubmitFailureKind};
    use crate::error::BackendError;
    use crate::mock::MockBackend;

    fn product() -> ProductLine {
        ProductLine {
            title: "P".to_string(),
            sku: "S".to_string(),
            quantity: 1,
            unit_price_minor: 100,
        }
    }

    fn deposito_draft() -> QuotationDraft {
        let mut draft = QuotationDraft::new(Role::Deposito, "D-1", "a@b.com", vec![product()]);
        draft.direccion_deposito = Some("Addr1".to_string());
        draft
    }

    #[tokio::test]
    async fn submitted_payload_carries_the_mapped_fields() {
        let backend = Arc::new(MockBackend::new());
        let outbox = QuotationOutbox::new(backend.clone());

        let receipt =
            outbox.send_quotation(&deposito_draft()).await.expect("submit should succeed");

        assert_eq!(receipt.message, "quotation submitted");
        let created = backend.created();
        assert_eq!(created.len(), 1);
        let fields = &created[0]["records"][0]["fields"];
        assert_eq!(fields["Idcliente"], "D-1");
        assert_eq!(fields["productos"], "P (SKU: S) - Cantidad: 1");
    }

    #[tokio::test]
    async fn missing_address_fails_before_any_network_call() {
        let backend = Arc::new(MockBackend::new());
        let outbox = QuotationOutbox::new(backend.clone());

        let mut draft = deposito_draft();
        draft.direccion_deposito = None;

        let failure = outbox.send_quotation(&draft).await.expect_err("submit should fail");

        assert_eq!(failure.kind, SubmitFailureKind::Validation);
        assert_eq!(failure.details.as_deref(), Some("direccionDeposito"));
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn missing_advisor_email_fails_before_any_network_call() {
        let backend = Arc::new(MockBackend::new());
        let outbox = QuotationOutbox::new(backend.clone());

        let mut draft = QuotationDraft::new(Role::Asesor, "A-1", "a@b.com", vec![product()]);
        draft.asesor = "Ana".to_string();
        draft.deposito = Some("D-9".to_string());

        let failure = outbox.send_quotation(&draft).await.expect_err("submit should fail");

        assert_eq!(failure.kind, SubmitFailureKind::Validation);
        assert_eq!(failure.details.as_deref(), Some("asesor"));
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn backend_rejection_surfaces_as_structured_failure() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next(BackendError::InvalidInput {
            message: "unknown column".to_string(),
        });
        let outbox = QuotationOutbox::new(backend.clone());

        let failure =
            outbox.send_quotation(&deposito_draft()).await.expect_err("submit should fail");

        assert_eq!(failure.kind, SubmitFailureKind::Backend);
        assert_eq!(failure.details.as_deref(), Some("unknown column"));
        // One attempt, no automatic retry of the write.
        assert_eq!(backend.create_calls(), 1);
    }
}
