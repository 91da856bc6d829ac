use serde::{Deserialize, Serialize};

/// One deposit association on an advisor record.
///
/// `names` is the comma split of the combined backend name string, kept
/// untrimmed; trimming happens where a label is matched back to an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRef {
    pub names: Vec<String>,
    pub deposit_id: String,
}

impl DepositRef {
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }
}

/// Reference data for a sales advisor, fetched read-only from the
/// advisors table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorRecord {
    pub id_asesor: String,
    pub depositos: Vec<DepositRef>,
}
