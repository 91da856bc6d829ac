//! Read-only lookups against the clients and advisors tables.

use std::sync::Arc;

use cotizador_core::config::AirtableTable;
use cotizador_core::fields;
use cotizador_core::{AdvisorRecord, ClientRecord, DepositRef};
use tracing::{debug, warn};

use crate::backend::{Record, RecordQuery, TableBackend};
use crate::client::{filter_formula, FilterOperator};
use crate::error::BackendError;

#[derive(Clone)]
pub struct ClientDirectory {
    backend: Arc<dyn TableBackend>,
}

impl ClientDirectory {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    /// Substring-find lookup on the client identifier column; maps the
    /// first matching record, defaulting absent optional columns to
    /// empty.
    pub async fn get_client_by_id(&self, client_id: &str) -> Result<ClientRecord, BackendError> {
        if client_id.trim().is_empty() {
            return Err(BackendError::InvalidInput {
                message: "client id is required".to_string(),
            });
        }

        let formula =
            filter_formula(fields::client::ID_CLIENTE, client_id, FilterOperator::Find);
        let page = self
            .backend
            .fetch(AirtableTable::Clients, &RecordQuery::filtered(formula))
            .await?;

        let Some(record) = page.records.first() else {
            debug!(client_id, "client lookup returned no records");
            return Err(BackendError::NotFound);
        };

        Ok(map_client(record))
    }

    pub async fn get_client_addresses(
        &self,
        client_id: &str,
    ) -> Result<Vec<String>, BackendError> {
        Ok(self.get_client_by_id(client_id).await?.direcciones)
    }

    /// Existence probe; swallows every failure into `false`.
    pub async fn validate_client(&self, client_id: &str) -> bool {
        match self.get_client_by_id(client_id).await {
            Ok(_) => true,
            Err(error) => {
                debug!(client_id, error = %error, "client validation failed");
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct AdvisorDirectory {
    backend: Arc<dyn TableBackend>,
}

impl AdvisorDirectory {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub async fn get_advisor_by_id(
        &self,
        advisor_id: &str,
    ) -> Result<AdvisorRecord, BackendError> {
        if advisor_id.trim().is_empty() {
            return Err(BackendError::InvalidInput {
                message: "advisor id is required".to_string(),
            });
        }

        let formula =
            filter_formula(fields::advisor::ID_ASESOR, advisor_id, FilterOperator::Find);
        let page = self
            .backend
            .fetch(AirtableTable::Advisors, &RecordQuery::filtered(formula))
            .await?;

        let Some(record) = page.records.first() else {
            debug!(advisor_id, "advisor lookup returned no records");
            return Err(BackendError::NotFound);
        };

        map_advisor(record)
    }

    /// Unfiltered listing of every advisor record. Records that fail the
    /// deposit cardinality check are skipped with a warning rather than
    /// poisoning the whole listing.
    pub async fn get_advisors(&self) -> Result<Vec<AdvisorRecord>, BackendError> {
        let page = self.backend.fetch(AirtableTable::Advisors, &RecordQuery::all()).await?;

        Ok(page
            .records
            .iter()
            .filter_map(|record| match map_advisor(record) {
                Ok(advisor) => Some(advisor),
                Err(error) => {
                    warn!(
                        event_name = "advisor.malformed_record",
                        record_id = %record.id,
                        error = %error,
                        "skipping malformed advisor record"
                    );
                    None
                }
            })
            .collect())
    }

    pub async fn get_advisor_deposits(
        &self,
        advisor_id: &str,
    ) -> Result<Vec<DepositRef>, BackendError> {
        Ok(self.get_advisor_by_id(advisor_id).await?.depositos)
    }

    pub async fn validate_advisor(&self, advisor_id: &str) -> bool {
        match self.get_advisor_by_id(advisor_id).await {
            Ok(_) => true,
            Err(error) => {
                debug!(advisor_id, error = %error, "advisor validation failed");
                false
            }
        }
    }
}

fn map_client(record: &Record) -> ClientRecord {
    ClientRecord {
        id: record.str_field(fields::client::ID_CLIENTE),
        direcciones: record.str_list_field(fields::client::DIRECCIONES_DEPOSITOS),
        rfc: record.str_field(fields::client::RFC),
        email: record.str_field(fields::client::EMAIL),
        telemarketing: record.str_field(fields::client::TELEMARKETING),
    }
}

/// Zips the advisor record's parallel list columns.
///
/// The base stores deposit associations as a list of combined name
/// strings (`"<id>,<display name>"`) next to a deposit-identifier list
/// that in practice holds exactly one id shared by every name entry. A
/// record that carries names with any other id cardinality is malformed
/// and rejected loudly instead of silently taking the first id.
fn map_advisor(record: &Record) -> Result<AdvisorRecord, BackendError> {
    let deposit_ids = record.str_list_field(fields::advisor::ID_DEPOSITO);
    let names = record.str_list_field(fields::advisor::ID_NAME);

    let depositos = if names.is_empty() {
        Vec::new()
    } else {
        if deposit_ids.len() != 1 {
            return Err(BackendError::InvalidInput {
                message: format!(
                    "advisor record carries {} deposit ids for {} name entries, expected exactly one",
                    deposit_ids.len(),
                    names.len()
                ),
            });
        }
        let deposit_id = &deposit_ids[0];

        names
            .iter()
            .map(|name| DepositRef {
                names: name.split(',').map(str::to_string).collect(),
                deposit_id: deposit_id.clone(),
            })
            .collect()
    };

    Ok(AdvisorRecord { id_asesor: record.str_field(fields::advisor::ID_ASESOR), depositos })
}
