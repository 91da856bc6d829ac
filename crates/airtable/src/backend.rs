use async_trait::async_trait;
use cotizador_core::config::AirtableTable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BackendError;

/// One backend record: opaque record id plus the field map keyed by
/// column display names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// String value of a field, empty when absent. Numbers are rendered
    /// as text since the base mixes text and number columns.
    pub fn str_field(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            _ => String::new(),
        }
    }

    /// List-of-strings value of a field. A bare string becomes a
    /// single-element list; anything else is empty.
    pub fn str_list_field(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(value)) => vec![value.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Read-query parameters; currently only the filter formula.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub filter_by_formula: Option<String>,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(formula: impl Into<String>) -> Self {
        Self { filter_by_formula: Some(formula.into()) }
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(formula) = &self.filter_by_formula {
            params.push(("filterByFormula", formula.clone()));
        }
        params
    }
}

/// Seam between the services and the wire. The HTTP client and the mock
/// backend both implement it; services receive an `Arc<dyn TableBackend>`
/// so tests can substitute doubles without monkey-patching.
#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn fetch(
        &self,
        table: AirtableTable,
        query: &RecordQuery,
    ) -> Result<RecordPage, BackendError>;

    async fn create(&self, table: AirtableTable, payload: &Value)
        -> Result<Value, BackendError>;
}
