pub mod config;
pub mod domain;
pub mod fields;
pub mod payload;
pub mod role;
pub mod validation;

pub use domain::advisor::{AdvisorRecord, DepositRef};
pub use domain::client::ClientRecord;
pub use domain::draft::{DraftPatch, QuotationDraft};
pub use domain::product::{Comment, ProductLine};
pub use role::{resolve_role, Role, RoleTags};
pub use validation::{authoritative_validate, quick_ready, FieldError};
