use serde::{Deserialize, Serialize};

/// Reference data for a warehouse client, fetched read-only from the
/// clients table. Missing optional backend fields default to empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub direcciones: Vec<String>,
    pub rfc: String,
    pub email: String,
    pub telemarketing: String,
}
