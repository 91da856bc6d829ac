//! Remote reference data for one mounted flow.
//!
//! The coordinator owns the client/deposit lookups a form needs before it
//! can submit: addresses for the deposit role, the deposit list (and the
//! addresses of the chosen deposit) for the advisor role. Loads are
//! tagged with a generation counter so a completion that arrives after
//! the coordinator moved on is discarded instead of clobbering newer
//! state.

use cotizador_airtable::{BackendError, Services};
use cotizador_core::{ClientRecord, DepositRef, Role};
use tracing::debug;

/// Lifecycle of one remote resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// One entry in the advisor's deposit picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositOption {
    /// Display label: the first name, joined with `", "` to the second
    /// when one exists.
    pub label: String,
    /// Trimmed first name; selections are matched back against this.
    pub id: String,
    /// Backend deposit identifier, falling back to the trimmed first
    /// name when the record carries none.
    pub deposit_id: String,
}

/// Loads and caches the remote data behind one form mount.
pub struct RemoteDataCoordinator {
    role: Role,
    state: LoadState,
    address_state: LoadState,
    client: Option<ClientRecord>,
    addresses: Vec<String>,
    deposits: Vec<DepositRef>,
    selected_deposit: Option<String>,
    generation: u64,
    address_generation: u64,
}

impl RemoteDataCoordinator {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: LoadState::Idle,
            address_state: LoadState::Idle,
            client: None,
            addresses: Vec::new(),
            deposits: Vec::new(),
            selected_deposit: None,
            generation: 0,
            address_generation: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Starts a new primary load and invalidates any in-flight one.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.generation
    }

    /// Applies a finished client lookup, unless a newer load has started
    /// since `generation` was handed out.
    pub fn complete_client_load(
        &mut self,
        generation: u64,
        result: Result<ClientRecord, BackendError>,
    ) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale client load");
            return;
        }
        match result {
            Ok(client) => {
                self.addresses = client.direcciones.clone();
                self.client = Some(client);
                self.state = LoadState::Ready;
            }
            Err(error) => {
                self.client = None;
                self.addresses.clear();
                self.state = LoadState::Failed(error.to_string());
            }
        }
    }

    pub fn complete_deposit_load(
        &mut self,
        generation: u64,
        result: Result<Vec<DepositRef>, BackendError>,
    ) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale deposit load");
            return;
        }
        match result {
            Ok(deposits) => {
                self.deposits = deposits;
                self.state = LoadState::Ready;
            }
            Err(error) => {
                self.deposits.clear();
                self.state = LoadState::Failed(error.to_string());
            }
        }
    }

    pub fn begin_address_load(&mut self) -> u64 {
        self.address_generation += 1;
        self.address_state = LoadState::Loading;
        self.address_generation
    }

    pub fn complete_address_load(
        &mut self,
        generation: u64,
        result: Result<Vec<String>, BackendError>,
    ) {
        if generation != self.address_generation {
            debug!(
                generation,
                current = self.address_generation,
                "discarding stale address load"
            );
            return;
        }
        match result {
            Ok(addresses) => {
                self.addresses = addresses;
                self.address_state = LoadState::Ready;
            }
            Err(error) => {
                self.addresses.clear();
                self.address_state = LoadState::Failed(error.to_string());
            }
        }
    }

    /// Initial load for the mount: the client record (deposit role) or
    /// the advisor's deposit list. A blank id is a quiet no-op, matching
    /// a storefront that mounts before its user data is available.
    pub async fn load(&mut self, services: &Services, user_id: &str) {
        if user_id.trim().is_empty() {
            debug!(role = %self.role, "skipping load, no user id yet");
            return;
        }

        match self.role {
            Role::Deposito => {
                let generation = self.begin_load();
                let result = services.clients.get_client_by_id(user_id).await;
                self.complete_client_load(generation, result);
            }
            Role::Asesor => {
                let generation = self.begin_load();
                let result = services.advisors.get_advisor_deposits(user_id).await;
                self.complete_deposit_load(generation, result);
            }
        }
    }

    /// Records the deposit choice and loads its addresses.
    pub async fn select_deposit(&mut self, services: &Services, deposit_id: &str) {
        self.selected_deposit = Some(deposit_id.to_string());
        let generation = self.begin_address_load();
        let result = services.clients.get_client_addresses(deposit_id).await;
        self.complete_address_load(generation, result);
    }

    /// Resolves a raw picker value (`"<first name>, <second name>"` or
    /// just the first name) back to a known deposit and selects it.
    /// Values that match no loaded deposit are ignored.
    pub async fn process_deposit_selection(
        &mut self,
        services: &Services,
        selected: &str,
    ) -> Option<String> {
        let first = selected.split(',').next().unwrap_or("").trim();
        if first.is_empty() {
            return None;
        }

        let deposit =
            self.deposits.iter().find(|deposit| deposit.primary_name().trim() == first)?;

        let deposit_id = effective_deposit_id(deposit);
        self.select_deposit(services, &deposit_id).await;
        Some(deposit_id)
    }

    pub fn deposit_options(&self) -> Vec<DepositOption> {
        self.deposits
            .iter()
            .filter_map(|deposit| {
                let first = deposit.names.first()?;
                let label = match deposit.names.get(1).filter(|name| !name.is_empty()) {
                    Some(second) => format!("{first}, {second}"),
                    None => first.clone(),
                };
                Some(DepositOption {
                    label,
                    id: first.trim().to_string(),
                    deposit_id: effective_deposit_id(deposit),
                })
            })
            .collect()
    }

    pub fn client(&self) -> Option<&ClientRecord> {
        self.client.as_ref()
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn deposits(&self) -> &[DepositRef] {
        &self.deposits
    }

    pub fn selected_deposit(&self) -> Option<&str> {
        self.selected_deposit.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading() || self.address_state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error().or_else(|| self.address_state.error())
    }

    /// Whether the flow has everything it needs from the backend: loaded
    /// addresses for the deposit role, a loaded deposit list plus a
    /// selection for the advisor role.
    pub fn is_ready(&self) -> bool {
        if self.is_loading() || self.error().is_some() {
            return false;
        }
        match self.role {
            Role::Deposito => !self.addresses.is_empty(),
            Role::Asesor => !self.deposits.is_empty() && self.selected_deposit.is_some(),
        }
    }

    /// Drops every loaded resource and invalidates in-flight loads.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.address_generation += 1;
        self.state = LoadState::Idle;
        self.address_state = LoadState::Idle;
        self.client = None;
        self.addresses.clear();
        self.deposits.clear();
        self.selected_deposit = None;
    }
}

fn effective_deposit_id(deposit: &DepositRef) -> String {
    if deposit.deposit_id.is_empty() {
        deposit.primary_name().trim().to_string()
    } else {
        deposit.deposit_id.clone()
    }
}
