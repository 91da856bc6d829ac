//! End-to-end walkthroughs of both flows against the in-memory backend,
//! driven the way the storefront drives the host.

use std::sync::Arc;

use cotizador_airtable::{MockBackend, Services};
use cotizador_core::config::AppConfig;
use cotizador_core::Comment;
use cotizador_widget::{
    mount_flow, FlowProps, HostQuotationData, ModalState, QuotationFlow, SubmissionState,
    WidgetContext,
};
use serde_json::json;

fn host_payload(role: &str, id: &str, email: &str) -> HostQuotationData {
    serde_json::from_value(json!({
        "role": role,
        "idCliente": id,
        "email": email,
        "productos": [
            { "title": "Filtro de aceite", "sku": "FIL-001", "quantity": 2, "price": 12550 },
            { "title": "Bujía", "sku": "BUJ-204", "quantity": 4, "price": 8900 }
        ]
    }))
    .expect("host payload should parse")
}

#[tokio::test]
async fn deposito_walkthrough_submits_through_the_host() {
    let mut config = AppConfig::default();
    config.widget.mock_mode = true;
    let mut context = WidgetContext::new(config).expect("context should build");

    context
        .render(Some("pedido"), host_payload("deposito", "D-123574654", "dep@test.com"))
        .await;

    let mount = context.mount_mut("pedido").expect("mount should exist");
    let view = mount.flow.view();
    assert_eq!(view.addresses.len(), 4);
    assert!(!view.submit_enabled);
    assert_eq!(view.total_items, 6);
    assert_eq!(view.total_price_minor, 2 * 12550 + 4 * 8900);

    let address = view.addresses[0].clone();
    mount.flow.select_address(&address);
    mount.flow.set_comments(vec![Comment {
        sku: "FIL-001".to_string(),
        text: "entregar por la mañana".to_string(),
    }]);
    assert!(mount.flow.view().submit_enabled);

    mount.flow.submit().await;

    let view = mount.flow.view();
    assert_eq!(view.submission, SubmissionState::Succeeded);
    assert!(matches!(view.modal, ModalState::Success { .. }));

    mount.flow.close_modal();
    assert_eq!(mount.flow.view().modal, ModalState::Closed);
}

#[tokio::test]
async fn asesor_walkthrough_records_the_chosen_deposit() {
    let backend = Arc::new(MockBackend::with_demo_data());
    let services = Arc::new(Services::new(backend.clone()));

    let props: FlowProps =
        host_payload("Asesor de ventas", "A-454654654", "asesor@test.com").into_props();
    let mut flow = mount_flow(services, &props);
    assert!(matches!(flow, QuotationFlow::Asesor(_)));

    flow.init().await;
    let options = flow.view().deposit_options;
    assert_eq!(options.len(), 2);

    flow.select_deposit(&options[0].label).await;
    let view = flow.view();
    assert_eq!(view.selected_deposit.as_deref(), Some("D-123574654"));
    assert_eq!(view.addresses.len(), 4);

    let address = view.addresses[1].clone();
    flow.select_address(&address);
    flow.submit().await;
    assert_eq!(flow.view().submission, SubmissionState::Succeeded);

    let fields = &backend.created()[0]["records"][0]["fields"];
    assert_eq!(fields["SolicitudPor"], "Asesor");
    assert_eq!(fields["Asesor"], "A-454654654");
    assert_eq!(fields["emailAsesor"], "asesor@test.com");
    assert_eq!(fields["Deposito"], "D-123574654");
    assert_eq!(fields["DireccionDeposito"], address.as_str());
    assert_eq!(
        fields["productos"],
        "Filtro de aceite (SKU: FIL-001) - Cantidad: 2; Bujía (SKU: BUJ-204) - Cantidad: 4"
    );
}

#[tokio::test]
async fn incomplete_host_data_surfaces_as_a_validation_modal() {
    let mut config = AppConfig::default();
    config.widget.mock_mode = true;
    let mut context = WidgetContext::new(config).expect("context should build");

    // No client id: the mount still succeeds, nothing is loaded, and a
    // forced submit reports the missing field instead of panicking.
    context
        .render(Some("pedido"), host_payload("deposito", "", "dep@test.com"))
        .await;

    let mount = context.mount_mut("pedido").expect("mount should exist");
    assert!(mount.flow.view().addresses.is_empty());
    assert!(!mount.flow.view().submit_enabled);

    mount.flow.submit().await;
    let view = mount.flow.view();
    assert!(matches!(view.submission, SubmissionState::Failed(_)));
    match view.modal {
        ModalState::Error { details, .. } => assert_eq!(details.as_deref(), Some("idCliente")),
        other => panic!("expected error modal, got {other:?}"),
    }
}
