//! In-memory [`TableBackend`] for demos and tests.
//!
//! Serves canned reference data without touching the live base (and its
//! rate limits). Activated only through the explicit mock-mode flag.

use std::sync::Mutex;

use async_trait::async_trait;
use cotizador_core::config::AirtableTable;
use cotizador_core::fields;
use cotizador_core::{AdvisorRecord, ClientRecord};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::backend::{Record, RecordPage, RecordQuery, TableBackend};
use crate::error::BackendError;

#[derive(Default)]
struct MockState {
    clients: Vec<Record>,
    advisors: Vec<Record>,
    created: Vec<Value>,
    fetch_calls: usize,
    create_calls: usize,
    fail_next: Option<BackendError>,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-loaded with the demo fixtures used for storefront
    /// walkthroughs: one warehouse client with four addresses and one
    /// advisor associated with two deposits.
    pub fn with_demo_data() -> Self {
        let backend = Self::new();

        backend.insert_client(&ClientRecord {
            id: "D-123574654".to_string(),
            direcciones: vec![
                "Dirección 1 - Sucursal Centro".to_string(),
                "Dirección 2 - Sucursal Norte".to_string(),
                "Dirección 3 - Sucursal Sur".to_string(),
                "Dirección 4 - Bodega Principal".to_string(),
            ],
            rfc: "RFC123456789".to_string(),
            email: "deposito@test.com".to_string(),
            telemarketing: "telemarketing@test.com".to_string(),
        });
        backend.insert_client(&ClientRecord {
            id: "D-COMPLETE-001".to_string(),
            direcciones: vec![
                "Dirección Completa 1".to_string(),
                "Dirección Completa 2".to_string(),
            ],
            rfc: "RFC987654321".to_string(),
            email: "completo@test.com".to_string(),
            telemarketing: "tel@test.com".to_string(),
        });

        backend.insert_advisor_raw(
            "A-454654654",
            vec!["D-123574654"],
            vec!["D-123574654,Cliente Test 1", "D-COMPLETE-001,Cliente Completo"],
        );

        backend
    }

    pub fn insert_client(&self, client: &ClientRecord) {
        let mut record_fields = Map::new();
        record_fields.insert(fields::client::ID_CLIENTE.to_string(), json!(client.id));
        record_fields.insert(
            fields::client::DIRECCIONES_DEPOSITOS.to_string(),
            json!(client.direcciones),
        );
        record_fields.insert(fields::client::RFC.to_string(), json!(client.rfc));
        record_fields.insert(fields::client::EMAIL.to_string(), json!(client.email));
        record_fields
            .insert(fields::client::TELEMARKETING.to_string(), json!(client.telemarketing));

        let mut state = self.state.lock().expect("mock state poisoned");
        let id = format!("recClient{}", state.clients.len() + 1);
        state.clients.push(Record { id, fields: record_fields });
    }

    /// Inserts an advisor record with the raw parallel-list shape the
    /// real base uses (`IdDeposito` ids next to combined `Idname`
    /// strings). Handy for exercising the cardinality check.
    pub fn insert_advisor_raw(&self, id_asesor: &str, deposit_ids: Vec<&str>, names: Vec<&str>) {
        let mut record_fields = Map::new();
        record_fields.insert(fields::advisor::ID_ASESOR.to_string(), json!(id_asesor));
        record_fields.insert(fields::advisor::ID_DEPOSITO.to_string(), json!(deposit_ids));
        record_fields.insert(fields::advisor::ID_NAME.to_string(), json!(names));

        let mut state = self.state.lock().expect("mock state poisoned");
        let id = format!("recAdvisor{}", state.advisors.len() + 1);
        state.advisors.push(Record { id, fields: record_fields });
    }

    pub fn insert_advisor(&self, advisor: &AdvisorRecord) {
        let mut deposit_ids: Vec<&str> = advisor
            .depositos
            .iter()
            .map(|deposit| deposit.deposit_id.as_str())
            .collect();
        deposit_ids.dedup();
        let names: Vec<String> =
            advisor.depositos.iter().map(|deposit| deposit.names.join(",")).collect();

        self.insert_advisor_raw(
            &advisor.id_asesor,
            deposit_ids,
            names.iter().map(String::as_str).collect(),
        );
    }

    /// Next call to `fetch` or `create` fails with `error` instead.
    pub fn fail_next(&self, error: BackendError) {
        self.state.lock().expect("mock state poisoned").fail_next = Some(error);
    }

    /// Payloads accepted by `create`, in call order.
    pub fn created(&self) -> Vec<Value> {
        self.state.lock().expect("mock state poisoned").created.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.state.lock().expect("mock state poisoned").fetch_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().expect("mock state poisoned").create_calls
    }
}

#[async_trait]
impl TableBackend for MockBackend {
    async fn fetch(
        &self,
        table: AirtableTable,
        query: &RecordQuery,
    ) -> Result<RecordPage, BackendError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.fetch_calls += 1;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        let (records, id_field) = match table {
            AirtableTable::Clients => (&state.clients, fields::client::ID_CLIENTE),
            AirtableTable::Advisors => (&state.advisors, fields::advisor::ID_ASESOR),
            AirtableTable::Quotations => {
                return Err(BackendError::InvalidInput {
                    message: "mock backend does not serve reads from quotations".to_string(),
                });
            }
        };

        let needle = query.filter_by_formula.as_deref().and_then(formula_needle);
        debug!(table = table.as_str(), needle = needle.as_deref(), "mock fetch");

        let matching = records
            .iter()
            .filter(|record| match &needle {
                Some(needle) => record.str_field(id_field).contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        Ok(RecordPage { records: matching })
    }

    async fn create(
        &self,
        table: AirtableTable,
        payload: &Value,
    ) -> Result<Value, BackendError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.create_calls += 1;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        if table != AirtableTable::Quotations {
            return Err(BackendError::InvalidInput {
                message: format!("mock backend only accepts writes to quotations, got {}", table.as_str()),
            });
        }

        state.created.push(payload.clone());
        let record_id = format!("recQuotation{}", state.created.len());
        Ok(json!({
            "records": [{ "id": record_id, "fields": payload["records"][0]["fields"] }]
        }))
    }
}

/// Pulls the quoted search value out of a filter formula; the mock only
/// needs the needle, not the full formula language.
fn formula_needle(formula: &str) -> Option<String> {
    let start = formula.find('"')? + 1;
    let length = formula[start..].find('"')?;
    Some(formula[start..start + length].to_string())
}
