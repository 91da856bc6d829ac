use std::time::Duration;

use async_trait::async_trait;
use cotizador_core::config::{AirtableConfig, AirtableTable};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{RecordPage, RecordQuery, TableBackend};
use crate::error::BackendError;

/// Operators supported by the backend's filter-formula language. Callers
/// pick the operator per lookup; `Find` (substring) is what the id
/// lookups use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOperator {
    Find,
    Equals,
    Contains,
}

/// Builds a `filterByFormula` search expression for one field/value pair.
pub fn filter_formula(field: &str, value: &str, operator: FilterOperator) -> String {
    match operator {
        FilterOperator::Find => format!("Find(\"{value}\", {field})"),
        FilterOperator::Equals => format!("{{{field}}} = \"{value}\""),
        FilterOperator::Contains => format!("SEARCH(\"{value}\", {{{field}}})"),
    }
}

/// HTTP implementation of [`TableBackend`].
///
/// Every request carries the bearer credential and JSON negotiation
/// headers. Reads get one automatic retry after a fixed delay when the
/// transport itself fails; classified HTTP errors are never retried, and
/// writes are never retried at all (user-initiated retry only).
pub struct AirtableClient {
    http: reqwest::Client,
    config: AirtableConfig,
}

impl AirtableClient {
    pub fn new(config: AirtableConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| BackendError::Configuration { message: error.to_string() })?;

        Ok(Self { http, config })
    }

    fn bearer(&self) -> Result<String, BackendError> {
        let api_key = self.config.api_key()?;
        Ok(format!("Bearer {}", api_key.expose_secret()))
    }

    async fn get_json(&self, url: &str, query: &RecordQuery) -> Result<Value, BackendError> {
        retry_transport_once(self.config.retry_delay_ms, || self.try_get(url, query)).await
    }

    async fn try_get(&self, url: &str, query: &RecordQuery) -> Result<Value, BackendError> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer()?)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .query(&query.params())
            .send()
            .await
            .map_err(transport_error)?;

        read_response(response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, BackendError> {
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer()?)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(response).await
    }
}

#[async_trait]
impl TableBackend for AirtableClient {
    async fn fetch(
        &self,
        table: AirtableTable,
        query: &RecordQuery,
    ) -> Result<RecordPage, BackendError> {
        let url = self.config.table_url(table)?;
        debug!(table = table.as_str(), "fetching records");

        let body = self.get_json(&url, query).await?;
        serde_json::from_value(body).map_err(|error| BackendError::Server {
            status: StatusCode::OK.as_u16(),
            message: format!("unexpected record page shape: {error}"),
        })
    }

    async fn create(
        &self,
        table: AirtableTable,
        payload: &Value,
    ) -> Result<Value, BackendError> {
        let url = self.config.table_url(table)?;
        debug!(table = table.as_str(), "creating record");

        self.post_json(&url, payload).await
    }
}

/// Runs `attempt`, and runs it once more after `delay_ms` if the first
/// try failed at the transport level. Classified HTTP errors pass
/// through untouched.
async fn retry_transport_once<T, F, Fut>(
    delay_ms: u64,
    mut attempt: F,
) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, BackendError>>,
{
    match attempt().await {
        Err(error) if error.is_transport() => {
            warn!(
                event_name = "backend.transport_retry",
                delay_ms,
                error = %error,
                "transport failure, retrying once"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            attempt().await
        }
        other => other,
    }
}

fn transport_error(error: reqwest::Error) -> BackendError {
    if error.is_builder() {
        BackendError::Configuration { message: error.to_string() }
    } else {
        BackendError::Network { message: error.to_string() }
    }
}

async fn read_response(response: reqwest::Response) -> Result<Value, BackendError> {
    let status = response.status();

    if status.is_success() {
        return response.json().await.map_err(|error| BackendError::Server {
            status: status.as_u16(),
            message: format!("invalid response body: {error}"),
        });
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("server error")
        .to_string();

    Err(BackendError::from_status(status.as_u16(), message))
}
