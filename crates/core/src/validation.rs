//! Two-tier draft validation.
//!
//! The quick tier gates the submit control in the UI and checks only
//! structural completeness. The authoritative tier runs in the write path
//! right before the backend call and adds the role-specific requirements.
//! Both are pure so either can be tested in isolation.

use serde::{Deserialize, Serialize};

use crate::domain::draft::QuotationDraft;
use crate::role::Role;

/// One failed requirement, naming the draft field it concerns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Optimistic submit gate: requester id, email and a non-empty cart.
///
/// Deliberately skips the role-specific requirements so the control can
/// enable slightly ahead of the authoritative check at submit time.
pub fn quick_ready(draft: &QuotationDraft) -> bool {
    !draft.id_cliente.trim().is_empty()
        && !draft.email.trim().is_empty()
        && !draft.productos.is_empty()
}

/// Full pre-write validation. Returns every failed requirement in field
/// order; the write path raises the first one.
pub fn authoritative_validate(draft: &QuotationDraft) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if draft.id_cliente.trim().is_empty() {
        errors.push(FieldError::new("idCliente", "missing required field: idCliente"));
    }
    if draft.email.trim().is_empty() {
        errors.push(FieldError::new("email", "missing required field: email"));
    }
    if draft.productos.is_empty() {
        errors.push(FieldError::new(
            "productos",
            "the quotation needs at least one product",
        ));
    }

    match draft.solicitud_por {
        Role::Deposito => {
            if is_blank(draft.direccion_deposito.as_deref()) {
                errors.push(FieldError::new(
                    "direccionDeposito",
                    "a deposit address is required for Deposito requests",
                ));
            }
        }
        Role::Asesor => {
            if draft.asesor.trim().is_empty() || draft.email_asesor.trim().is_empty() {
                errors.push(FieldError::new(
                    "asesor",
                    "advisor name and email are required for Asesor requests",
                ));
            }
            if is_blank(draft.deposito.as_deref()) {
                errors.push(FieldError::new(
                    "deposito",
                    "a deposit must be selected for Asesor requests",
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{authoritative_validate, quick_ready};
    use crate::domain::draft::QuotationDraft;
    use crate::domain::product::ProductLine;
    use crate::role::Role;

    fn product() -> ProductLine {
        ProductLine {
            title: "P".to_string(),
            sku: "S".to_string(),
            quantity: 1,
            unit_price_minor: 100,
        }
    }

    fn deposito_draft() -> QuotationDraft {
        let mut draft = QuotationDraft::new(Role::Deposito, "D-1", "a@b.com", vec![product()]);
        draft.direccion_deposito = Some("Addr1".to_string());
        draft
    }

    fn asesor_draft() -> QuotationDraft {
        let mut draft = QuotationDraft::new(Role::Asesor, "A-1", "a@b.com", vec![product()]);
        draft.asesor = "Ana".to_string();
        draft.email_asesor = "ana@b.com".to_string();
        draft.deposito = Some("D-9".to_string());
        draft
    }

    #[test]
    fn quick_ready_requires_id_email_and_products() {
        assert!(quick_ready(&deposito_draft()));

        let mut missing_id = deposito_draft();
        missing_id.id_cliente = " ".to_string();
        assert!(!quick_ready(&missing_id));

        let mut missing_email = deposito_draft();
        missing_email.email = String::new();
        assert!(!quick_ready(&missing_email));

        let mut empty_cart = deposito_draft();
        empty_cart.productos.clear();
        assert!(!quick_ready(&empty_cart));
    }

    #[test]
    fn quick_ready_ignores_role_specific_fields() {
        let mut draft = deposito_draft();
        draft.direccion_deposito = None;
        assert!(quick_ready(&draft));
    }

    #[test]
    fn deposito_draft_without_address_names_the_address_field() {
        let mut draft = deposito_draft();
        draft.direccion_deposito = None;

        let errors = authoritative_validate(&draft).expect_err("should fail");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "direccionDeposito");
    }

    #[test]
    fn asesor_draft_without_advisor_email_names_advisor_data() {
        let mut draft = asesor_draft();
        draft.email_asesor = String::new();

        let errors = authoritative_validate(&draft).expect_err("should fail");
        assert_eq!(errors[0].field, "asesor");
    }

    #[test]
    fn asesor_draft_without_deposit_selection_fails() {
        let mut draft = asesor_draft();
        draft.deposito = None;

        let errors = authoritative_validate(&draft).expect_err("should fail");
        assert!(errors.iter().any(|error| error.field == "deposito"));
    }

    #[test]
    fn complete_drafts_validate_for_both_roles() {
        assert!(authoritative_validate(&deposito_draft()).is_ok());
        assert!(authoritative_validate(&asesor_draft()).is_ok());
    }

    #[test]
    fn all_failures_are_collected_in_field_order() {
        let draft = QuotationDraft::new(Role::Deposito, "", "", Vec::new());

        let errors = authoritative_validate(&draft).expect_err("should fail");
        let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["idCliente", "email", "productos", "direccionDeposito"]);
    }
}
