//! Backend field-name catalog.
//!
//! The tabular backend addresses columns by display name; these constants
//! are the single place those names appear. They must match the base
//! schema exactly, including the inconsistent casing.

/// Columns of the quotations (write) table.
pub mod quotation {
    pub const ID_CLIENTE: &str = "Idcliente";
    pub const DIRECCION_DEPOSITO: &str = "DireccionDeposito";
    pub const COMENTARIO: &str = "Comentario";
    pub const PRODUCTOS: &str = "productos";
    pub const EMAIL: &str = "Email";
    pub const RFC: &str = "RFC";
    pub const EMAIL_TELEMARKETING: &str = "emailTelemarketing";
    pub const ASESOR: &str = "Asesor";
    pub const EMAIL_ASESOR: &str = "emailAsesor";
    pub const NAME_PRODUCT: &str = "NameProduct";
    pub const SKU_PRODUCT: &str = "SkuProduct";
    pub const CANTIDAD_PRODUCT: &str = "CantidadProduct";
    pub const SOLICITUD_POR: &str = "SolicitudPor";
    pub const DEPOSITO: &str = "Deposito";
}

/// Columns of the clients (read) table.
pub mod client {
    pub const ID_CLIENTE: &str = "IDcliente";
    pub const DIRECCIONES_DEPOSITOS: &str = "DireccionesDepositos";
    pub const RFC: &str = "RFC";
    pub const EMAIL: &str = "Email";
    pub const TELEMARKETING: &str = "Telemarketing";
}

/// Columns of the advisors (read) table.
pub mod advisor {
    pub const ID_ASESOR: &str = "idAsesor";
    pub const ID_DEPOSITO: &str = "IdDeposito";
    pub const ID_NAME: &str = "Idname";
}

/// Fixed strings written into backend fields.
pub mod messages {
    pub const NO_COMMENTS: &str = "No hay comentarios";
    pub const NO_PRODUCTS: &str = "No hay productos";
}
