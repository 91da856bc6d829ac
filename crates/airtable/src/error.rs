use cotizador_core::config::MissingBackendConfig;
use thiserror::Error;

/// Failure taxonomy for every backend interaction.
///
/// HTTP statuses map onto the first six variants; `Network` means the
/// request got no response at all, and `Configuration` means it was
/// never sent (missing credentials, bad request construction).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("authentication with the backend failed")]
    Authentication,
    #[error("not allowed to access this resource")]
    Authorization,
    #[error("record not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("rate limit exceeded, try again later")]
    RateLimited,
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("network unreachable: {message}")]
    Network { message: String },
    #[error("request configuration error: {message}")]
    Configuration { message: String },
}

impl BackendError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Authentication,
            403 => Self::Authorization,
            404 => Self::NotFound,
            422 => Self::InvalidInput { message },
            429 => Self::RateLimited,
            _ => Self::Server { status, message },
        }
    }

    /// Transport-level failures are the only ones the client retries.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<MissingBackendConfig> for BackendError {
    fn from(gap: MissingBackendConfig) -> Self {
        Self::Configuration { message: gap.to_string() }
    }
}
