use anyhow::{anyhow, Result};
use reqwest::Client;

use crate::message::WireMessage;
use crate::router::SendRequest;

/// HTTP client for the relay server fronting both chat backends and
/// the shared image endpoint.
#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// One-shot history fetch used to seed the conversation at startup.
    pub async fn fetch_history(&self) -> Result<Vec<WireMessage>> {
        let url = format!("{}/messages", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "history fetch failed with status: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }

    /// Run one routed send to completion and hand back the raw reply
    /// array. Callers normalize; this layer only moves JSON.
    pub async fn send(&self, request: &SendRequest) -> Result<Vec<WireMessage>> {
        let url = format!("{}{}", self.base_url, request.endpoint.path());

        let response = self
            .client
            .post(&url)
            .json(&request.payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "{} request failed with status: {}. Is the relay server running?",
                request.endpoint.path(),
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}
