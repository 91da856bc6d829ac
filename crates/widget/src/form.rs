//! Draft editing and submission state for one quotation form.

use cotizador_airtable::{QuotationOutbox, SubmitFailure, SubmitReceipt};
use cotizador_core::{quick_ready, Comment, DraftPatch, QuotationDraft};
use tracing::debug;

/// Copy shown in the success modal after an accepted submission.
pub const SUCCESS_MESSAGE: &str =
    "Tu solicitud de cotización ha sido enviada correctamente. Te contactaremos pronto.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(SubmitFailure),
}

/// What the result modal is currently showing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Success { message: String },
    Error { message: String, details: Option<String> },
}

/// Owns the draft and the submission lifecycle.
///
/// Transitions are one-way per attempt: `Idle -> Submitting -> Succeeded`
/// or `-> Failed`. A failed attempt is left in `Failed` until the user
/// retries or the state is reset; `submit` from `Failed` is a no-op so a
/// double-tapped button cannot fire a second write behind the modal.
pub struct QuotationFormCoordinator {
    initial: QuotationDraft,
    draft: QuotationDraft,
    state: SubmissionState,
    modal: ModalState,
    last_receipt: Option<SubmitReceipt>,
}

impl QuotationFormCoordinator {
    pub fn new(draft: QuotationDraft) -> Self {
        Self {
            initial: draft.clone(),
            draft,
            state: SubmissionState::Idle,
            modal: ModalState::Closed,
            last_receipt: None,
        }
    }

    pub fn draft(&self) -> &QuotationDraft {
        &self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn last_receipt(&self) -> Option<&SubmitReceipt> {
        self.last_receipt.as_ref()
    }

    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.draft.comentarios = comments;
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.draft.direccion_deposito = Some(address.into());
    }

    pub fn set_deposit(&mut self, deposit_id: impl Into<String>) {
        self.draft.deposito = Some(deposit_id.into());
    }

    /// Drops the chosen address; used when a new deposit selection makes
    /// the previous address list obsolete.
    pub fn clear_address(&mut self) {
        self.draft.direccion_deposito = None;
    }

    pub fn merge(&mut self, patch: DraftPatch) {
        self.draft.apply(patch);
    }

    /// Cheap eligibility gate for the submit button. The authoritative
    /// check still runs inside the outbox on submit.
    pub fn is_ready_to_send(&self) -> bool {
        quick_ready(&self.draft) && !matches!(self.state, SubmissionState::Submitting)
    }

    /// Submits the draft. Ignored while an attempt is in flight or after
    /// a failure (failures go through [`Self::retry`]).
    pub async fn submit(&mut self, outbox: &QuotationOutbox) {
        match self.state {
            SubmissionState::Submitting => {
                debug!("submit ignored, attempt already in flight");
            }
            SubmissionState::Failed(_) => {
                debug!("submit ignored from failed state, retry is explicit");
            }
            _ => self.send(outbox).await,
        }
    }

    /// User-initiated retry after a failure. Only valid from `Failed`.
    pub async fn retry(&mut self, outbox: &QuotationOutbox) {
        match self.state {
            SubmissionState::Failed(_) => self.send(outbox).await,
            _ => debug!("retry ignored, no failed attempt to retry"),
        }
    }

    async fn send(&mut self, outbox: &QuotationOutbox) {
        self.state = SubmissionState::Submitting;
        match outbox.send_quotation(&self.draft).await {
            Ok(receipt) => {
                self.last_receipt = Some(receipt);
                self.state = SubmissionState::Succeeded;
                self.modal = ModalState::Success { message: SUCCESS_MESSAGE.to_string() };
            }
            Err(failure) => {
                self.modal = ModalState::Error {
                    message: failure.message.clone(),
                    details: failure.details.clone(),
                };
                self.state = SubmissionState::Failed(failure);
            }
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
    }

    /// Clears the send outcome, keeping the draft as edited.
    pub fn reset_send_state(&mut self) {
        self.state = SubmissionState::Idle;
        self.modal = ModalState::Closed;
    }

    /// Back to the mount-time draft and a clean send state.
    pub fn clear(&mut self) {
        self.draft = self.initial.clone();
        self.last_receipt = None;
        self.reset_send_state();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cotizador_airtable::{BackendError, MockBackend, QuotationOutbox};
    use cotizador_core::{Comment, ProductLine, QuotationDraft, Role};

    use super::{ModalState, QuotationFormCoordinator, SubmissionState, SUCCESS_MESSAGE};

    fn product() -> ProductLine {
        ProductLine {
            title: "P".to_string(),
            sku: "S".to_string(),
            quantity: 1,
            unit_price_minor: 100,
        }
    }

    fn deposito_form() -> QuotationFormCoordinator {
        let mut draft = QuotationDraft::new(Role::Deposito, "D-1", "a@b.com", vec![product()]);
        draft.direccion_deposito = Some("Sucursal Centro".to_string());
        QuotationFormCoordinator::new(draft)
    }

    #[tokio::test]
    async fn successful_submit_opens_the_success_modal() {
        let backend = Arc::new(MockBackend::new());
        let outbox = QuotationOutbox::new(backend.clone());
        let mut form = deposito_form();

        form.submit(&outbox).await;

        assert_eq!(*form.state(), SubmissionState::Succeeded);
        assert_eq!(
            *form.modal(),
            ModalState::Success { message: SUCCESS_MESSAGE.to_string() }
        );
        assert!(form.last_receipt().is_some());
        assert_eq!(backend.create_calls(), 1);
    }

    #[tokio::test]
    async fn invalid_draft_fails_without_touching_the_backend() {
        let backend = Arc::new(MockBackend::new());
        let outbox = QuotationOutbox::new(backend.clone());
        let draft = QuotationDraft::new(Role::Deposito, "", "", Vec::new());
        let mut form = QuotationFormCoordinator::new(draft);

        assert!(!form.is_ready_to_send());
        form.submit(&outbox).await;

        assert!(matches!(form.state(), SubmissionState::Failed(_)));
        assert!(matches!(form.modal(), ModalState::Error { .. }));
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn failed_attempt_requires_an_explicit_retry() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next(BackendError::RateLimited);
        let outbox = QuotationOutbox::new(backend.clone());
        let mut form = deposito_form();

        form.submit(&outbox).await;
        assert!(matches!(form.state(), SubmissionState::Failed(_)));
        assert_eq!(backend.create_calls(), 1);

        // A plain submit from Failed is swallowed.
        form.submit(&outbox).await;
        assert_eq!(backend.create_calls(), 1);

        form.retry(&outbox).await;
        assert_eq!(*form.state(), SubmissionState::Succeeded);
        assert_eq!(backend.create_calls(), 2);
    }

    #[tokio::test]
    async fn retry_is_a_noop_without_a_failure() {
        let backend = Arc::new(MockBackend::new());
        let outbox = QuotationOutbox::new(backend.clone());
        let mut form = deposito_form();

        form.retry(&outbox).await;

        assert_eq!(*form.state(), SubmissionState::Idle);
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn clear_restores_the_mount_time_draft() {
        let backend = Arc::new(MockBackend::new());
        let outbox = QuotationOutbox::new(backend.clone());
        let mut form = deposito_form();

        form.set_comments(vec![Comment { sku: "S".to_string(), text: "nota".to_string() }]);
        form.set_address("Otra dirección");
        form.submit(&outbox).await;

        form.clear();

        assert!(form.draft().comentarios.is_empty());
        assert_eq!(form.draft().direccion_deposito.as_deref(), Some("Sucursal Centro"));
        assert_eq!(*form.state(), SubmissionState::Idle);
        assert_eq!(*form.modal(), ModalState::Closed);
        assert!(form.last_receipt().is_none());
    }
}
