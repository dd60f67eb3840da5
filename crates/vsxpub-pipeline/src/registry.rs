//! Extension registry client
//!
//! Three calls are consumed: existence lookup, namespace creation and
//! publish. `OpenVsxClient` speaks the Open VSX REST API.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use vsxpub_core::types::ExtensionId;

/// Registry marker for a namespace that is already there
const ALREADY_EXISTS: &str = "already exists";

/// What the registry knows about a published extension
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryListing {
    pub namespace: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Result of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedExtension {
    pub namespace: String,
    pub name: String,
    pub version: String,
    /// Public page of the published version
    pub location: String,
}

/// Registry operations used by the pipeline
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Latest published version, or `None` when the extension is absent
    async fn lookup(&self, id: &ExtensionId) -> Result<Option<RegistryListing>>;

    /// Create a namespace; an existing namespace is not an error
    async fn create_namespace(&self, namespace: &str, token: &str) -> Result<()>;

    /// Upload an artifact
    async fn publish(&self, artifact: &Path, token: &str) -> Result<PublishedExtension>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublishBody {
    namespace: String,
    name: String,
    version: String,
}

/// `RegistryClient` for an Open VSX server
pub struct OpenVsxClient {
    base_url: Url,
    client: reqwest::Client,
}

impl OpenVsxClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            PipelineError::registry(None, format!("invalid registry URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("vsxpub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PipelineError::registry(None, "registry URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_token(mut url: Url, token: &str) -> Url {
        url.query_pairs_mut().append_pair("token", token);
        url
    }

    fn location(&self, published: &PublishBody) -> String {
        format!(
            "{}/extension/{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            published.namespace,
            published.name,
            published.version
        )
    }
}

/// Turn a non-success response into a registry error carrying the server's message
async fn error_from(response: reqwest::Response) -> PipelineError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            }
        });

    PipelineError::registry(Some(status.as_u16()), message)
}

#[async_trait]
impl RegistryClient for OpenVsxClient {
    async fn lookup(&self, id: &ExtensionId) -> Result<Option<RegistryListing>> {
        let url = self.endpoint(&["api", id.namespace(), id.name()])?;
        debug!("Registry lookup: {}", url);

        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let text = response.text().await?;
                // The registry answers some unknown ids with 200 and an error body
                if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_str(&text) {
                    debug!("Registry has no {}: {}", id, error);
                    return Ok(None);
                }
                Ok(Some(serde_json::from_str(&text)?))
            }
            _ => Err(error_from(response).await),
        }
    }

    async fn create_namespace(&self, namespace: &str, token: &str) -> Result<()> {
        let url = Self::with_token(self.endpoint(&["api", "-", "namespace", "create"])?, token);

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "name": namespace }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        match error_from(response).await {
            PipelineError::Registry { message, .. } if message.contains(ALREADY_EXISTS) => {
                debug!("Namespace {} already exists", namespace);
                Ok(())
            }
            e => Err(e),
        }
    }

    async fn publish(&self, artifact: &Path, token: &str) -> Result<PublishedExtension> {
        let url = Self::with_token(self.endpoint(&["api", "-", "publish"])?, token);
        let bytes = tokio::fs::read(artifact).await?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let text = response.text().await?;
        if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_str(&text) {
            return Err(PipelineError::registry(None, error));
        }

        let published: PublishBody = serde_json::from_str(&text)?;
        Ok(PublishedExtension {
            location: self.location(&published),
            namespace: published.namespace,
            name: published.name,
            version: published.version,
        })
    }
}
