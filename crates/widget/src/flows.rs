//! The two role-specific form flows.
//!
//! Both flows wire a [`RemoteDataCoordinator`] and a
//! [`QuotationFormCoordinator`] to one [`Services`] handle. The deposit
//! flow loads the mounting client's own addresses; the advisor flow adds
//! the deposit picker in front and folds the chosen deposit into the
//! draft. Hosts receive the same [`FlowView`] snapshot from either.

use std::sync::Arc;

use cotizador_airtable::Services;
use cotizador_core::domain::product;
use cotizador_core::{Comment, DraftPatch, ProductLine, QuotationDraft, Role, RoleTags};
use tracing::debug;

use crate::form::{ModalState, QuotationFormCoordinator, SubmissionState};
use crate::remote::{DepositOption, RemoteDataCoordinator};

/// Mount-time inputs handed over by the storefront, forwarded to the
/// flows unchanged.
#[derive(Clone, Debug, Default)]
pub struct FlowProps {
    pub role_tags: Option<RoleTags>,
    pub id_cliente: String,
    pub email: String,
    pub productos: Vec<ProductLine>,
    pub total_items: u32,
    pub total_price_minor: i64,
}

impl FlowProps {
    /// Host-provided totals when present, otherwise derived from the
    /// product lines.
    pub fn effective_totals(&self) -> (u32, i64) {
        let items = if self.total_items == 0 {
            product::total_items(&self.productos)
        } else {
            self.total_items
        };
        let price = if self.total_price_minor == 0 {
            product::total_price_minor(&self.productos)
        } else {
            self.total_price_minor
        };
        (items, price)
    }
}

/// Render-ready snapshot of a flow.
#[derive(Clone, Debug)]
pub struct FlowView {
    pub role: Role,
    pub loading: bool,
    pub load_error: Option<String>,
    pub addresses: Vec<String>,
    pub deposit_options: Vec<DepositOption>,
    pub selected_address: Option<String>,
    pub selected_deposit: Option<String>,
    pub submission: SubmissionState,
    pub modal: ModalState,
    pub submit_enabled: bool,
    pub total_items: u32,
    pub total_price_minor: i64,
}

/// Flow for a storefront user tagged as a deposit.
pub struct DepositoFlow {
    services: Arc<Services>,
    pub remote: RemoteDataCoordinator,
    pub form: QuotationFormCoordinator,
}

impl DepositoFlow {
    pub fn new(services: Arc<Services>, props: &FlowProps) -> Self {
        let draft = QuotationDraft::new(
            Role::Deposito,
            &props.id_cliente,
            &props.email,
            props.productos.clone(),
        );
        Self {
            services,
            remote: RemoteDataCoordinator::new(Role::Deposito),
            form: QuotationFormCoordinator::new(draft),
        }
    }

    /// Loads the client record and folds its billing columns into the
    /// draft.
    pub async fn init(&mut self) {
        let client_id = self.form.draft().id_cliente.clone();
        self.remote.load(&self.services, &client_id).await;

        if let Some(client) = self.remote.client() {
            self.form.merge(DraftPatch {
                rfc: Some(client.rfc.clone()),
                telemarketing: Some(client.telemarketing.clone()),
                ..DraftPatch::default()
            });
        }
    }

    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.form.set_comments(comments);
    }

    pub fn select_address(&mut self, address: &str) {
        self.form.set_address(address);
    }

    pub fn submit_enabled(&self) -> bool {
        self.remote.is_ready()
            && self.form.draft().direccion_deposito.is_some()
            && self.form.is_ready_to_send()
    }

    pub async fn submit(&mut self) {
        self.form.submit(&self.services.quotations).await;
    }

    pub async fn retry(&mut self) {
        self.form.retry(&self.services.quotations).await;
    }

    pub fn close_modal(&mut self) {
        self.form.close_modal();
    }

    pub fn view(&self) -> FlowView {
        flow_view(&self.remote, &self.form, self.submit_enabled())
    }
}

/// Flow for a storefront user tagged as an advisor.
pub struct AsesorFlow {
    services: Arc<Services>,
    pub remote: RemoteDataCoordinator,
    pub form: QuotationFormCoordinator,
}

impl AsesorFlow {
    pub fn new(services: Arc<Services>, props: &FlowProps) -> Self {
        let mut draft = QuotationDraft::new(
            Role::Asesor,
            &props.id_cliente,
            &props.email,
            props.productos.clone(),
        );
        // The advisor quotes on behalf of a deposit, so the mounting
        // identity doubles as the advisor columns.
        draft.asesor = props.id_cliente.clone();
        draft.email_asesor = props.email.clone();

        Self {
            services,
            remote: RemoteDataCoordinator::new(Role::Asesor),
            form: QuotationFormCoordinator::new(draft),
        }
    }

    /// Loads the advisor's deposit list; addresses follow the deposit
    /// selection.
    pub async fn init(&mut self) {
        let advisor_id = self.form.draft().id_cliente.clone();
        self.remote.load(&self.services, &advisor_id).await;
    }

    pub fn deposit_options(&self) -> Vec<DepositOption> {
        self.remote.deposit_options()
    }

    /// Handles a raw picker value. Valid selections load the deposit's
    /// addresses and clear any previously chosen address; anything else
    /// is ignored.
    pub async fn select_deposit(&mut self, selected: &str) {
        match self.remote.process_deposit_selection(&self.services, selected).await {
            Some(deposit_id) => {
                self.form.set_deposit(&deposit_id);
                self.form.clear_address();
                debug!(deposit_id, "deposit selected");
            }
            None => debug!(selected, "ignoring unknown deposit selection"),
        }
    }

    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.form.set_comments(comments);
    }

    pub fn select_address(&mut self, address: &str) {
        self.form.set_address(address);
    }

    pub fn submit_enabled(&self) -> bool {
        self.remote.is_ready()
            && self.form.draft().deposito.is_some()
            && self.form.draft().direccion_deposito.is_some()
            && self.form.is_ready_to_send()
    }

    pub async fn submit(&mut self) {
        self.form.submit(&self.services.quotations).await;
    }

    pub async fn retry(&mut self) {
        self.form.retry(&self.services.quotations).await;
    }

    pub fn close_modal(&mut self) {
        self.form.close_modal();
    }

    pub fn view(&self) -> FlowView {
        flow_view(&self.remote, &self.form, self.submit_enabled())
    }
}

fn flow_view(
    remote: &RemoteDataCoordinator,
    form: &QuotationFormCoordinator,
    submit_enabled: bool,
) -> FlowView {
    FlowView {
        role: remote.role(),
        loading: remote.is_loading(),
        load_error: remote.error().map(str::to_string),
        addresses: remote.addresses().to_vec(),
        deposit_options: remote.deposit_options(),
        selected_address: form.draft().direccion_deposito.clone(),
        selected_deposit: remote.selected_deposit().map(str::to_string),
        submission: form.state().clone(),
        modal: form.modal().clone(),
        submit_enabled,
        total_items: form.draft().total_items(),
        total_price_minor: form.draft().total_price_minor(),
    }
}
