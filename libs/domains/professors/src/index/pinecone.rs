use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::VectorIndex;
use crate::config::PineconeConfig;
use crate::error::{ChatError, ChatResult, UpstreamService};
use crate::models::{IndexMatch, IndexQuery};

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";
const API_VERSION: &str = "2024-07";

/// Pinecone data-plane client bound to one index host
pub struct PineconeIndex {
    client: Client,
    config: PineconeConfig,
    host: String,
    dimension: Option<u32>,
}

/// Subset of the control-plane index description
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub status: Option<IndexStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: u32,
    include_values: bool,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<IndexMatch>,
}

fn upstream(err: impl std::fmt::Display) -> ChatError {
    ChatError::upstream(UpstreamService::VectorIndex, err)
}

/// Control-plane hosts come without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

impl PineconeIndex {
    /// Bind to the configured host, or look the host up by index name.
    ///
    /// Called once at startup so that a wrong key or index name fails fast.
    pub async fn connect(config: PineconeConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {}", e)))?;

        let (host, dimension) = match &config.index_host {
            Some(host) => (normalize_host(host), None),
            None => {
                let description = describe_index(&client, &config).await?;
                if let Some(status) = description.status.as_ref().filter(|s| !s.ready) {
                    warn!(
                        index = %description.name,
                        state = status.state.as_deref().unwrap_or("unknown"),
                        "Pinecone index is not ready"
                    );
                }
                (normalize_host(&description.host), description.dimension)
            }
        };

        info!(
            index = %config.index_name,
            namespace = %config.namespace,
            host = %host,
            "Pinecone index bound"
        );

        Ok(Self {
            client,
            config,
            host,
            dimension,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Vector dimension reported by the control plane, when it was consulted.
    pub fn dimension(&self) -> Option<u32> {
        self.dimension
    }
}

async fn describe_index(client: &Client, config: &PineconeConfig) -> ChatResult<IndexDescription> {
    let response = client
        .get(format!("{}/indexes/{}", config.control_url, config.index_name))
        .header(API_KEY_HEADER, &config.api_key)
        .header(API_VERSION_HEADER, API_VERSION)
        .send()
        .await
        .map_err(upstream)?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(upstream(format!(
            "describe index '{}' failed ({}): {}",
            config.index_name, status, error_text
        )));
    }

    response.json().await.map_err(upstream)
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, query: IndexQuery) -> ChatResult<Vec<IndexMatch>> {
        let request = QueryRequest {
            namespace: &query.namespace,
            vector: &query.vector,
            top_k: query.top_k,
            include_values: false,
            include_metadata: query.include_metadata,
        };

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(upstream)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(upstream(format!(
                "Pinecone query error ({}): {}",
                status, error_text
            )));
        }

        let body: QueryResponse = response.json().await.map_err(upstream)?;
        debug!(matches = body.matches.len(), "Pinecone query answered");

        Ok(body.matches)
    }
}
