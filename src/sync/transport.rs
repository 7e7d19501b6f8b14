//! The client's connection to the remote store.

use crate::{
    errors::{Error, Result},
    model::Snapshot,
};
use reqwest::{Client, Response};
use serde_json::Value;
use std::{future::Future, time::Duration};
use tracing::debug;

/// Delivers commands to, and loads snapshots from, the remote store.
pub trait Transport: Send + Sync + 'static {
    /// Sends one wire-encoded command.
    fn send_command(&self, body: &Value) -> impl Future<Output = Result<()>> + Send;

    /// Runs fetch-all-and-heal for the session's user.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot>> + Send;
}

/// JSON over HTTP with a bearer session token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpTransport {
    /// Transport for `base_url` (e.g. `https://api.example.com`) using `token`.
    ///
    /// # Errors
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/data", base_url.trim_end_matches('/')),
            token: token.into(),
        })
    }
}

/// Turns a non-success status into [`Error::Remote`], reading the `{error}` envelope.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
    Err(Error::Remote {
        status: status.as_u16(),
        message,
    })
}

impl Transport for HttpTransport {
    async fn send_command(&self, body: &Value) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        ensure_success(response).await?;
        debug!("Command delivered");
        Ok(())
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let snapshot = ensure_success(response).await?.json::<Snapshot>().await?;
        Ok(snapshot)
    }
}
