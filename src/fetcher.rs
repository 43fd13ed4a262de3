use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::DocsError;

/// Outcome of a single GET.
#[derive(Debug)]
pub enum Fetched {
    /// 200 response body.
    Page(String),
    /// Any other status. The caller logs and skips it.
    Miss(StatusCode),
}

/// Anything that can turn a URL into page HTML.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<Fetched, DocsError>;
}

/// Plain HTTP fetcher: no timeout, no retry, no extra headers.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched, DocsError> {
        let transport = |e: reqwest::Error| DocsError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        debug!(url, %status, "response");
        if status != StatusCode::OK {
            return Ok(Fetched::Miss(status));
        }

        let body = response.text().await.map_err(transport)?;
        Ok(Fetched::Page(body))
    }
}
