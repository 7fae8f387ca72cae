//! HTTP client for the workshops backend.

use crate::config::BackendConfig;
use crate::model::{NewSession, Session, VoteType, Workshop};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use snafu::prelude::*;
use std::time::Duration;

#[derive(Debug, Snafu)]
pub enum ApiError {
    #[snafu(display("Request failed with status code {status}"))]
    Status { status: u16, message: String },

    #[snafu(display("Network Error: {source}"))]
    Network { source: reqwest::Error },

    #[snafu(display("Invalid response from server: {source}"))]
    Decode { source: reqwest::Error },

    #[snafu(display("Failed to create HTTP client: {source}"))]
    Build { source: reqwest::Error },
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Filters for `GET /workshops`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkshopsQuery {
    pub page: Option<u32>,
    pub category: Option<String>,
}

impl WorkshopsQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            category: None,
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("_page", page.to_string()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        pairs
    }
}

pub struct WorkshopsClient {
    base_url: String,
    http_client: Client,
}

impl WorkshopsClient {
    pub fn builder() -> WorkshopsClientBuilder {
        WorkshopsClientBuilder::new()
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_workshops(&self, query: &WorkshopsQuery) -> Result<Vec<Workshop>> {
        let response = self
            .http_client
            .get(self.url("/workshops"))
            .query(&query.pairs())
            .send()
            .await
            .context(NetworkSnafu)?;
        decode(response).await
    }

    pub async fn get_workshop_by_id(&self, id: u64) -> Result<Workshop> {
        let response = self
            .http_client
            .get(self.url(&format!("/workshops/{id}")))
            .send()
            .await
            .context(NetworkSnafu)?;
        decode(response).await
    }

    pub async fn get_sessions_for_workshop(&self, workshop_id: u64) -> Result<Vec<Session>> {
        let response = self
            .http_client
            .get(self.url(&format!("/workshops/{workshop_id}/sessions")))
            .send()
            .await
            .context(NetworkSnafu)?;
        decode(response).await
    }

    /// Record a vote. The server returns the updated session.
    pub async fn vote_for_session(&self, session_id: u64, vote: VoteType) -> Result<Session> {
        let response = self
            .http_client
            .put(self.url(&format!("/sessions/{session_id}/{vote}")))
            .send()
            .await
            .context(NetworkSnafu)?;
        decode(response).await
    }

    pub async fn post_session(&self, session: &NewSession) -> Result<Session> {
        let response = self
            .http_client
            .post(self.url("/sessions"))
            .json(session)
            .send()
            .await
            .context(NetworkSnafu)?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), %message, "backend request failed");
        return StatusSnafu {
            status: status.as_u16(),
            message,
        }
        .fail();
    }
    response.json::<T>().await.context(DecodeSnafu)
}

pub struct WorkshopsClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl WorkshopsClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<WorkshopsClient> {
        let defaults = BackendConfig::default();
        let base_url = self.base_url.unwrap_or(defaults.base_url);
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(defaults.timeout_secs));

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context(BuildSnafu)?;

        Ok(WorkshopsClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

impl Default for WorkshopsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
