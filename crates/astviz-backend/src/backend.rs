use astviz_model::ParseResult;
use tracing::warn;

use crate::error::BackendError;
use crate::local::LocalBackend;
use crate::protocol::InputFormat;
use crate::remote::RemoteBackend;

/// Enum over the interchangeable parse strategies.
///
/// Which variant runs is a configuration decision made by the
/// orchestrator; all of them answer the same
/// `parse(code, format) -> ParseResult` contract.
#[derive(Clone)]
pub enum ParseBackend {
    Remote(RemoteBackend),
    Local(LocalBackend),
    /// Local strategy preferred, remote tried when the local one fails.
    LocalWithFallback(LocalBackend, RemoteBackend),
}

impl ParseBackend {
    pub async fn parse(
        &self,
        code: &str,
        format: InputFormat,
    ) -> Result<ParseResult, BackendError> {
        match self {
            ParseBackend::Remote(remote) => remote.parse(code, format).await,
            ParseBackend::Local(local) => local.parse(code, format).await,
            ParseBackend::LocalWithFallback(local, remote) => {
                match local.parse(code, format).await {
                    Ok(result) => Ok(result),
                    Err(err) => {
                        warn!("local parse failed, falling back to remote: {}", err);
                        remote.parse(code, format).await
                    }
                }
            }
        }
    }
}
