use std::time::Duration;

use astviz_model::ParseResult;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::BackendError;
use crate::protocol::{InputFormat, PARSE_PATH, ParseRequest};

/// Builds the HTTP client shared by the remote strategy and the share
/// codec: crate-version user agent, bounded connect and request
/// timeouts, modest connection pool.
pub fn build_client(timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .user_agent(format!("astviz/{}", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .timeout(timeout)
        .build()
        .map_err(BackendError::from)
}

/// Remote parse strategy: one POST per parse against the parse service.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    parse_url: Url,
}

impl RemoteBackend {
    pub fn new(base_url: &Url, client: Client) -> Result<Self, BackendError> {
        Ok(Self {
            client,
            parse_url: base_url.join(PARSE_PATH)?,
        })
    }

    /// Sends `{code, format}` to the parse endpoint. A non-success
    /// status maps to [`BackendError::Status`]; the body decodes into a
    /// [`ParseResult`] whose missing fields default to empty.
    pub async fn parse(
        &self,
        code: &str,
        format: InputFormat,
    ) -> Result<ParseResult, BackendError> {
        debug!("POST {} ({} bytes)", self.parse_url, code.len());

        let response = self
            .client
            .post(self.parse_url.clone())
            .json(&ParseRequest { code, format })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        Ok(response.json::<ParseResult>().await?)
    }
}
