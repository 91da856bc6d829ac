//! Role resolution and flow dispatch.

use std::sync::Arc;

use cotizador_airtable::Services;
use cotizador_core::{resolve_role, Comment, Role};
use tracing::{debug, info};

use crate::flows::{AsesorFlow, DepositoFlow, FlowProps, FlowView};

/// A mounted flow of either role, driven through one interface by the
/// host.
pub enum QuotationFlow {
    Deposito(DepositoFlow),
    Asesor(AsesorFlow),
}

impl QuotationFlow {
    pub fn role(&self) -> Role {
        match self {
            Self::Deposito(_) => Role::Deposito,
            Self::Asesor(_) => Role::Asesor,
        }
    }

    pub async fn init(&mut self) {
        match self {
            Self::Deposito(flow) => flow.init().await,
            Self::Asesor(flow) => flow.init().await,
        }
    }

    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        match self {
            Self::Deposito(flow) => flow.set_comments(comments),
            Self::Asesor(flow) => flow.set_comments(comments),
        }
    }

    pub fn select_address(&mut self, address: &str) {
        match self {
            Self::Deposito(flow) => flow.select_address(address),
            Self::Asesor(flow) => flow.select_address(address),
        }
    }

    /// Deposit selection only exists in the advisor flow; the deposit
    /// flow ignores it.
    pub async fn select_deposit(&mut self, selected: &str) {
        match self {
            Self::Deposito(_) => {
                debug!(selected, "deposit selection ignored in deposito flow");
            }
            Self::Asesor(flow) => flow.select_deposit(selected).await,
        }
    }

    pub async fn submit(&mut self) {
        match self {
            Self::Deposito(flow) => flow.submit().await,
            Self::Asesor(flow) => flow.submit().await,
        }
    }

    pub async fn retry(&mut self) {
        match self {
            Self::Deposito(flow) => flow.retry().await,
            Self::Asesor(flow) => flow.retry().await,
        }
    }

    pub fn close_modal(&mut self) {
        match self {
            Self::Deposito(flow) => flow.close_modal(),
            Self::Asesor(flow) => flow.close_modal(),
        }
    }

    pub fn view(&self) -> FlowView {
        match self {
            Self::Deposito(flow) => flow.view(),
            Self::Asesor(flow) => flow.view(),
        }
    }
}

/// Resolves the role from the storefront tags and builds the matching
/// flow. Props are forwarded to the flow unchanged; the default role is
/// deposit when no tag mentions an advisor.
pub fn mount_flow(services: Arc<Services>, props: &FlowProps) -> QuotationFlow {
    let role = resolve_role(props.role_tags.as_ref());
    info!(
        event_name = "widget.flow_routed",
        role = %role,
        id_cliente = %props.id_cliente,
        "routing quotation flow"
    );

    match role {
        Role::Deposito => QuotationFlow::Deposito(DepositoFlow::new(services, props)),
        Role::Asesor => QuotationFlow::Asesor(AsesorFlow::new(services, props)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cotizador_airtable::{MockBackend, Services};
    use cotizador_core::{Role, RoleTags};

    use super::mount_flow;
    use crate::flows::FlowProps;

    fn services() -> Arc<Services> {
        Arc::new(Services::new(Arc::new(MockBackend::with_demo_data())))
    }

    fn props_with_tags(tags: Option<RoleTags>) -> FlowProps {
        FlowProps {
            role_tags: tags,
            id_cliente: "D-1".to_string(),
            email: "a@b.com".to_string(),
            ..FlowProps::default()
        }
    }

    #[test]
    fn advisor_tag_routes_to_the_asesor_flow() {
        let flow = mount_flow(
            services(),
            &props_with_tags(Some(RoleTags::Single("Asesor Senior".to_string()))),
        );
        assert_eq!(flow.role(), Role::Asesor);
    }

    #[test]
    fn anything_else_routes_to_the_deposito_flow() {
        let flow =
            mount_flow(services(), &props_with_tags(Some(RoleTags::Single("vip".to_string()))));
        assert_eq!(flow.role(), Role::Deposito);

        let flow = mount_flow(services(), &props_with_tags(None));
        assert_eq!(flow.role(), Role::Deposito);
    }

    #[test]
    fn props_reach_the_flow_unchanged() {
        let flow = mount_flow(services(), &props_with_tags(None));
        let draft = match &flow {
            super::QuotationFlow::Deposito(inner) => inner.form.draft(),
            super::QuotationFlow::Asesor(inner) => inner.form.draft(),
        };
        assert_eq!(draft.id_cliente, "D-1");
        assert_eq!(draft.email, "a@b.com");
    }

    #[tokio::test]
    async fn deposit_selection_is_a_noop_for_deposito() {
        let mut flow = mount_flow(services(), &props_with_tags(None));
        flow.select_deposit("D-123574654, Cliente Test 1").await;
        assert!(flow.view().selected_deposit.is_none());
    }
}
