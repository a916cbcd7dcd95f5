use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::BackendError;
use crate::protocol::{LOAD_PATH, LoadRequest, LoadResponse, SHARE_PATH, ShareRequest, ShareResponse};

/// Round trips between source text and an opaque share token.
///
/// Persisting the token somewhere retrievable (a URL parameter) is the
/// caller's job; this type only performs the service round trip.
#[derive(Debug, Clone)]
pub struct ShareCodec {
    client: Client,
    share_url: Url,
    load_url: Url,
}

impl ShareCodec {
    pub fn new(base_url: &Url, client: Client) -> Result<Self, BackendError> {
        Ok(Self {
            client,
            share_url: base_url.join(SHARE_PATH)?,
            load_url: base_url.join(LOAD_PATH)?,
        })
    }

    /// Stores `code` and returns the opaque token it can be retrieved by.
    pub async fn encode(&self, code: &str) -> Result<String, BackendError> {
        debug!("POST {} ({} bytes)", self.share_url, code.len());

        let response = self
            .client
            .post(self.share_url.clone())
            .json(&ShareRequest { code })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        Ok(response.json::<ShareResponse>().await?.hash)
    }

    /// Retrieves the source text stored under `token`. An unknown token
    /// maps to [`BackendError::TokenNotFound`] so callers can present a
    /// specific message instead of a generic transport failure.
    pub async fn decode(&self, token: &str) -> Result<String, BackendError> {
        debug!("POST {} (token {})", self.load_url, token);

        let response = self
            .client
            .post(self.load_url.clone())
            .json(&LoadRequest { hash: token })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::TokenNotFound(token.to_string()));
        }
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        Ok(response.json::<LoadResponse>().await?.code)
    }
}
