//! Widget host: the embedding surface the storefront talks to.
//!
//! One [`WidgetContext`] owns the configuration, the service set and the
//! active mounts. The storefront hands over its user/cart snapshot as
//! [`HostQuotationData`] (camelCase JSON), the context routes it to a
//! flow and tracks the mount per container id. Mock mode swaps the
//! backend for the in-memory one through an explicit flag, never through
//! hostname sniffing.

use std::collections::HashMap;
use std::sync::Arc;

use cotizador_airtable::{AirtableClient, BackendError, MockBackend, Services};
use cotizador_core::config::AppConfig;
use cotizador_core::{ProductLine, RoleTags};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::flows::FlowProps;
use crate::router::{mount_flow, QuotationFlow};

/// One product line as the storefront serializes it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostProduct {
    pub title: String,
    pub sku: String,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub price: i64,
}

/// The mount payload the storefront provides. Every field defaults so a
/// partial snapshot still mounts (and then fails validation visibly
/// rather than at parse time).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostQuotationData {
    pub role: Option<RoleTags>,
    pub id_cliente: String,
    pub email: String,
    pub productos: Vec<HostProduct>,
    pub total_items: u32,
    pub total_price: i64,
}

impl HostQuotationData {
    pub fn into_props(self) -> FlowProps {
        let productos: Vec<ProductLine> = self
            .productos
            .into_iter()
            .map(|product| ProductLine {
                title: product.title,
                sku: product.sku,
                quantity: product.quantity,
                unit_price_minor: product.price,
            })
            .collect();

        let mut props = FlowProps {
            role_tags: self.role,
            id_cliente: self.id_cliente,
            email: self.email,
            productos,
            total_items: self.total_items,
            total_price_minor: self.total_price,
        };
        let (items, price) = props.effective_totals();
        props.total_items = items;
        props.total_price_minor = price;
        props
    }
}

/// An active mount in one storefront container.
pub struct MountHandle {
    pub instance_id: Uuid,
    pub container_id: String,
    pub flow: QuotationFlow,
}

/// Snapshot for support tooling.
#[derive(Clone, Debug, Serialize)]
pub struct DebugInfo {
    pub active_containers: Vec<String>,
    pub mount_count: usize,
    pub mock_mode: bool,
}

/// Owns configuration, services and the container-to-mount registry.
pub struct WidgetContext {
    config: AppConfig,
    services: Arc<Services>,
    mock_mode: bool,
    mounts: HashMap<String, MountHandle>,
}

impl WidgetContext {
    pub fn new(config: AppConfig) -> Result<Self, BackendError> {
        let mock_mode = config.widget.mock_mode;
        let services = build_services(&config, mock_mode)?;
        Ok(Self { config, services, mock_mode, mounts: HashMap::new() })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_mock_mode(&self) -> bool {
        self.mock_mode
    }

    /// Switches the backend. Existing mounts keep the services they were
    /// built with; only new mounts see the change.
    pub fn set_mock_mode(&mut self, enabled: bool) -> Result<(), BackendError> {
        if enabled == self.mock_mode {
            return Ok(());
        }
        self.services = build_services(&self.config, enabled)?;
        self.mock_mode = enabled;
        info!(event_name = "widget.backend_switched", mock_mode = enabled, "widget backend switched");
        Ok(())
    }

    /// Mounts a flow into `container_id` (the configured default when
    /// `None`), replacing any mount already living there. Runs the
    /// flow's initial load before returning the instance id.
    pub async fn render(
        &mut self,
        container_id: Option<&str>,
        data: HostQuotationData,
    ) -> Uuid {
        self.render_with_props(container_id, data.into_props()).await
    }

    /// Same as [`Self::render`] for callers that already hold
    /// [`FlowProps`].
    pub async fn render_with_props(
        &mut self,
        container_id: Option<&str>,
        props: FlowProps,
    ) -> Uuid {
        let container = match container_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => self.config.widget.default_container_id.clone(),
        };

        if self.mounts.remove(&container).is_some() {
            debug!(container = %container, "replacing existing mount");
        }

        let mut flow = mount_flow(self.services.clone(), &props);
        flow.init().await;

        let instance_id = Uuid::new_v4();
        info!(
            event_name = "widget.mounted",
            container = %container,
            instance_id = %instance_id,
            role = %flow.role(),
            "widget mounted"
        );
        self.mounts.insert(
            container.clone(),
            MountHandle { instance_id, container_id: container, flow },
        );
        instance_id
    }

    pub fn mount(&self, container_id: &str) -> Option<&MountHandle> {
        self.mounts.get(container_id)
    }

    pub fn mount_mut(&mut self, container_id: &str) -> Option<&mut MountHandle> {
        self.mounts.get_mut(container_id)
    }

    /// Unmounts one container. Returns whether anything was removed.
    pub fn cleanup(&mut self, container_id: &str) -> bool {
        let removed = self.mounts.remove(container_id).is_some();
        if removed {
            info!(event_name = "widget.unmounted", container = container_id, "widget unmounted");
        } else {
            debug!(container = container_id, "cleanup on container without a mount");
        }
        removed
    }

    pub fn cleanup_all(&mut self) {
        let count = self.mounts.len();
        self.mounts.clear();
        if count > 0 {
            info!(event_name = "widget.cleanup_all", count, "all widget mounts removed");
        }
    }

    pub fn debug_info(&self) -> DebugInfo {
        let mut active_containers: Vec<String> = self.mounts.keys().cloned().collect();
        active_containers.sort();
        DebugInfo {
            active_containers,
            mount_count: self.mounts.len(),
            mock_mode: self.mock_mode,
        }
    }
}

fn build_services(config: &AppConfig, mock_mode: bool) -> Result<Arc<Services>, BackendError> {
    if mock_mode {
        info!(event_name = "widget.mock_backend_active", "mock backend active, no live requests will be made");
        return Ok(Arc::new(Services::new(Arc::new(MockBackend::with_demo_data()))));
    }
    let client = AirtableClient::new(config.airtable.clone())?;
    Ok(Arc::new(Services::new(Arc::new(client))))
}

/// Installs the global subscriber per the logging section.
pub fn init_logging(config: &AppConfig) {
    use cotizador_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
