//! Maps a quotation draft onto the backend's write payload.
//!
//! The backend stores the quotation as one record with fixed column
//! names; the cart and the comments are flattened into the human-readable
//! strings the back office reads.

use serde_json::{json, Map, Value};

use crate::domain::draft::QuotationDraft;
use crate::domain::product::{Comment, ProductLine};
use crate::fields::{messages, quotation};
use crate::role::Role;

/// `"<title> (SKU: <sku>) - Cantidad: <qty>"`, joined with `"; "`.
pub fn format_products(products: &[ProductLine]) -> String {
    if products.is_empty() {
        return messages::NO_PRODUCTS.to_string();
    }

    products
        .iter()
        .map(|product| {
            format!(
                "{} (SKU: {}) - Cantidad: {}",
                product.title, product.sku, product.quantity
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bullet-list markup, one `<li>` per comment in input order, or the
/// fixed "no comments" placeholder.
pub fn format_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return messages::NO_COMMENTS.to_string();
    }

    let items: String = comments
        .iter()
        .map(|comment| format!("<li>{}: {}</li>", comment.sku, comment.text))
        .collect();

    format!("<ul style=\"padding: 2px; margin: 0px;\">{items}</ul>")
}

pub fn format_product_names(products: &[ProductLine]) -> String {
    products.iter().map(|product| product.title.clone()).collect::<Vec<_>>().join(", ")
}

pub fn format_product_skus(products: &[ProductLine]) -> String {
    products.iter().map(|product| product.sku.clone()).collect::<Vec<_>>().join(", ")
}

pub fn format_product_quantities(products: &[ProductLine]) -> String {
    products
        .iter()
        .map(|product| product.quantity.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the single-record write payload.
///
/// Role-specific columns are only present for the matching role; the
/// `Deposito` column falls back to the requester id when no deposit was
/// selected (warehouse flow).
pub fn build_quotation_payload(draft: &QuotationDraft) -> Value {
    let mut fields = Map::new();

    fields.insert(quotation::ID_CLIENTE.to_string(), json!(draft.id_cliente));
    fields.insert(quotation::EMAIL.to_string(), json!(draft.email));
    fields.insert(quotation::PRODUCTOS.to_string(), json!(format_products(&draft.productos)));
    fields.insert(quotation::SOLICITUD_POR.to_string(), json!(draft.solicitud_por.as_str()));
    fields.insert(quotation::COMENTARIO.to_string(), json!(format_comments(&draft.comentarios)));
    fields.insert(
        quotation::DEPOSITO.to_string(),
        json!(draft.deposito.clone().unwrap_or_else(|| draft.id_cliente.clone())),
    );

    match draft.solicitud_por {
        Role::Deposito => {
            insert_shared_role_fields(&mut fields, draft);
        }
        Role::Asesor => {
            fields.insert(quotation::ASESOR.to_string(), json!(draft.asesor));
            fields.insert(quotation::EMAIL_ASESOR.to_string(), json!(draft.email_asesor));
            insert_shared_role_fields(&mut fields, draft);
        }
    }

    if !draft.productos.is_empty() {
        fields.insert(
            quotation::NAME_PRODUCT.to_string(),
            json!(format_product_names(&draft.productos)),
        );
        fields.insert(
            quotation::SKU_PRODUCT.to_string(),
            json!(format_product_skus(&draft.productos)),
        );
        fields.insert(
            quotation::CANTIDAD_PRODUCT.to_string(),
            json!(format_product_quantities(&draft.productos)),
        );
    }

    json!({
        "records": [{ "fields": Value::Object(fields) }],
        "typecast": true,
    })
}

fn insert_shared_role_fields(fields: &mut Map<String, Value>, draft: &QuotationDraft) {
    fields.insert(
        quotation::DIRECCION_DEPOSITO.to_string(),
        json!(draft.direccion_deposito.clone().unwrap_or_default()),
    );
    fields.insert(quotation::RFC.to_string(), json!(draft.rfc));
    fields.insert(quotation::EMAIL_TELEMARKETING.to_string(), json!(draft.telemarketing));
}
