use reqwest::StatusCode;

/// Failures raised by the parse backends and the share codec.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Network failure or response body decode failure during a remote call.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The remote endpoint answered with a non-success status.
    #[error("HTTP error: status {0}")]
    Status(StatusCode),
    /// A configured endpoint URL could not be derived from the base URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The runtime shim never signalled readiness within its budget.
    #[error("runtime shim did not become available in time")]
    InitTimeout,
    /// The module never registered its parse entry point within its budget.
    #[error("parse module failed to register its entry point")]
    ModuleNotReady,
    /// The local module itself reported a runtime error.
    #[error("parse module error: {0}")]
    ModuleRuntime(String),
    /// The share token is unknown to the store.
    #[error("unknown share token: {0}")]
    TokenNotFound(String),
    /// The endpoint reported a failure inside a success-shaped response.
    #[error("engine error: {0}")]
    Engine(String),
}

impl BackendError {
    /// Lets callers present the unknown-token case distinctly from
    /// transport failures.
    pub fn is_token_not_found(&self) -> bool {
        matches!(self, BackendError::TokenNotFound(_))
    }
}
