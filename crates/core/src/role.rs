use serde::{Deserialize, Serialize};

/// The two request flows the widget can render. Serialized values match
/// the backend's `SolicitudPor` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Deposito,
    Asesor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposito => "Deposito",
            Self::Asesor => "Asesor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role tags as handed over by the host page: either one tag string or a
/// list of tags (storefront customer tags).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleTags {
    Single(String),
    Many(Vec<String>),
}

impl RoleTags {
    fn joined(&self) -> String {
        match self {
            Self::Single(tag) => tag.clone(),
            Self::Many(tags) => tags.join(" "),
        }
    }
}

/// Normalizes host-page role tags to a [`Role`].
///
/// Any tag containing `asesor` (case-insensitive substring, also inside a
/// multi-tag input) selects the advisor flow; everything else, including
/// absent or empty input, defaults to the warehouse flow.
pub fn resolve_role(tags: Option<&RoleTags>) -> Role {
    let Some(tags) = tags else {
        return Role::Deposito;
    };

    if tags.joined().to_lowercase().contains("asesor") {
        Role::Asesor
    } else {
        Role::Deposito
    }
}
