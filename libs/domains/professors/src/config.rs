use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};

use crate::models::EmbeddingModel;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";
pub const DEFAULT_PINECONE_INDEX: &str = "rag";
pub const DEFAULT_PINECONE_NAMESPACE: &str = "ns1";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// OpenAI configuration, shared by the embedding and chat-completion clients
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: EmbeddingModel,
    pub chat_model: String,
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embedding_model: EmbeddingModel::default(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_chat_model(mut self, chat_model: String) -> Self {
        self.chat_model = chat_model;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        let base_url = env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let embedding_model = env_or_default(
            "OPENAI_EMBEDDING_MODEL",
            EmbeddingModel::default().model_name(),
        )
        .parse::<EmbeddingModel>()
        .map_err(|details| ConfigError::ParseError {
            key: "OPENAI_EMBEDDING_MODEL".to_string(),
            details,
        })?;

        let chat_model = env_or_default("OPENAI_CHAT_MODEL", DEFAULT_CHAT_MODEL);
        let timeout = upstream_timeout()?;

        Ok(Self {
            api_key,
            base_url,
            embedding_model,
            chat_model,
            timeout,
        })
    }
}

/// Pinecone configuration
///
/// When `index_host` is unset the data-plane host is looked up by index name
/// through the control plane at startup.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub index_name: String,
    pub namespace: String,
    pub index_host: Option<String>,
    pub control_url: String,
    pub timeout: Duration,
}

impl PineconeConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            index_name: DEFAULT_PINECONE_INDEX.to_string(),
            namespace: DEFAULT_PINECONE_NAMESPACE.to_string(),
            index_host: None,
            control_url: DEFAULT_PINECONE_CONTROL_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }

    pub fn with_index_host(mut self, host: String) -> Self {
        self.index_host = Some(host);
        self
    }

    pub fn with_namespace(mut self, namespace: String) -> Self {
        self.namespace = namespace;
        self
    }
}

impl FromEnv for PineconeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("PINECONE_API_KEY")?;
        let index_name = env_or_default("PINECONE_INDEX", DEFAULT_PINECONE_INDEX);
        let namespace = env_or_default("PINECONE_NAMESPACE", DEFAULT_PINECONE_NAMESPACE);
        let index_host = std::env::var("PINECONE_INDEX_HOST")
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        let control_url = env_or_default("PINECONE_CONTROL_URL", DEFAULT_PINECONE_CONTROL_URL)
            .trim_end_matches('/')
            .to_string();
        let timeout = upstream_timeout()?;

        Ok(Self {
            api_key,
            index_name,
            namespace,
            index_host,
            control_url,
            timeout,
        })
    }
}

fn upstream_timeout() -> Result<Duration, ConfigError> {
    let secs = env_parse("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)?;
    if secs == 0 {
        return Err(ConfigError::ParseError {
            key: "UPSTREAM_TIMEOUT_SECS".to_string(),
            details: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
