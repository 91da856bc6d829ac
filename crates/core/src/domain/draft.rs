use serde::{Deserialize, Serialize};

use crate::domain::product::{self, Comment, ProductLine};
use crate::role::Role;

/// In-progress quotation for one form session.
///
/// Created fresh per mount, mutated incrementally by user input through
/// [`DraftPatch`] and the coordinator setters, submitted once. The draft
/// itself enforces nothing; eligibility lives in the validation tiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationDraft {
    pub solicitud_por: Role,
    pub id_cliente: String,
    pub email: String,
    pub productos: Vec<ProductLine>,
    pub comentarios: Vec<Comment>,
    /// Address picked from the lookup results.
    pub direccion_deposito: Option<String>,
    /// Selected deposit identifier (advisor flow only).
    pub deposito: Option<String>,
    pub rfc: String,
    pub telemarketing: String,
    pub asesor: String,
    pub email_asesor: String,
}

impl QuotationDraft {
    pub fn new(
        solicitud_por: Role,
        id_cliente: impl Into<String>,
        email: impl Into<String>,
        productos: Vec<ProductLine>,
    ) -> Self {
        Self {
            solicitud_por,
            id_cliente: id_cliente.into(),
            email: email.into(),
            productos,
            comentarios: Vec::new(),
            direccion_deposito: None,
            deposito: None,
            rfc: String::new(),
            telemarketing: String::new(),
            asesor: String::new(),
            email_asesor: String::new(),
        }
    }

    pub fn total_items(&self) -> u32 {
        product::total_items(&self.productos)
    }

    pub fn total_price_minor(&self) -> i64 {
        product::total_price_minor(&self.productos)
    }

    /// Shallow-merges `patch` into the draft: only fields the patch
    /// carries are replaced, everything else is left as-is.
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(id_cliente) = patch.id_cliente {
            self.id_cliente = id_cliente;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(productos) = patch.productos {
            self.productos = productos;
        }
        if let Some(comentarios) = patch.comentarios {
            self.comentarios = comentarios;
        }
        if let Some(direccion_deposito) = patch.direccion_deposito {
            self.direccion_deposito = Some(direccion_deposito);
        }
        if let Some(deposito) = patch.deposito {
            self.deposito = Some(deposito);
        }
        if let Some(rfc) = patch.rfc {
            self.rfc = rfc;
        }
        if let Some(telemarketing) = patch.telemarketing {
            self.telemarketing = telemarketing;
        }
        if let Some(asesor) = patch.asesor {
            self.asesor = asesor;
        }
        if let Some(email_asesor) = patch.email_asesor {
            self.email_asesor = email_asesor;
        }
    }
}

/// Partial update for [`QuotationDraft::apply`]. Absent fields are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub id_cliente: Option<String>,
    pub email: Option<String>,
    pub productos: Option<Vec<ProductLine>>,
    pub comentarios: Option<Vec<Comment>>,
    pub direccion_deposito: Option<String>,
    pub deposito: Option<String>,
    pub rfc: Option<String>,
    pub telemarketing: Option<String>,
    pub asesor: Option<String>,
    pub email_asesor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{DraftPatch, QuotationDraft};
    use crate::domain::product::{Comment, ProductLine};
    use crate::role::Role;

    fn draft() -> QuotationDraft {
        QuotationDraft::new(
            Role::Deposito,
            "D-1",
            "a@b.com",
            vec![ProductLine {
                title: "P".to_string(),
                sku: "S".to_string(),
                quantity: 2,
                unit_price_minor: 100,
            }],
        )
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut draft = draft();
        draft.apply(DraftPatch {
            direccion_deposito: Some("Sucursal Centro".to_string()),
            rfc: Some("RFC123".to_string()),
            ..DraftPatch::default()
        });

        assert_eq!(draft.direccion_deposito.as_deref(), Some("Sucursal Centro"));
        assert_eq!(draft.rfc, "RFC123");
        assert_eq!(draft.id_cliente, "D-1");
        assert_eq!(draft.email, "a@b.com");
    }

    #[test]
    fn apply_replaces_comments_wholesale() {
        let mut draft = draft();
        draft.comentarios =
            vec![Comment { sku: "S".to_string(), text: "viejo".to_string() }];

        draft.apply(DraftPatch {
            comentarios: Some(vec![Comment {
                sku: "S".to_string(),
                text: "nuevo".to_string(),
            }]),
            ..DraftPatch::default()
        });

        assert_eq!(draft.comentarios.len(), 1);
        assert_eq!(draft.comentarios[0].text, "nuevo");
    }

    #[test]
    fn totals_derive_from_products() {
        let draft = draft();
        assert_eq!(draft.total_items(), 2);
        assert_eq!(draft.total_price_minor(), 200);
    }
}
