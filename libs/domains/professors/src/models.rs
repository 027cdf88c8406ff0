use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ChatError, ChatResult, UpstreamService};

/// Number of professors retrieved and presented per query.
pub const TOP_K: u32 = 3;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A validated, non-empty conversation.
///
/// The last message is the active query; everything before it is history
/// that is forwarded to the model untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    history: Vec<Message>,
    query: Message,
}

impl Conversation {
    pub fn query(&self) -> &Message {
        &self.query
    }

    /// Total number of messages, including the query.
    pub fn message_count(&self) -> usize {
        self.history.len() + 1
    }

    pub fn into_parts(self) -> (Vec<Message>, Message) {
        (self.history, self.query)
    }
}

impl TryFrom<Vec<Message>> for Conversation {
    type Error = ChatError;

    fn try_from(mut messages: Vec<Message>) -> ChatResult<Self> {
        let query = messages
            .pop()
            .ok_or_else(|| ChatError::BadRequest("conversation must not be empty".to_string()))?;

        if query.content.trim().is_empty() {
            return Err(ChatError::BadRequest(
                "last message content must not be blank".to_string(),
            ));
        }

        Ok(Self {
            history: messages,
            query,
        })
    }
}

/// Embedding model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum EmbeddingModel {
    /// OpenAI text-embedding-ada-002 (1536 dimensions, the professor index is built with it)
    #[default]
    TextEmbeddingAda002,
    /// OpenAI text-embedding-3-small (1536 dimensions)
    TextEmbedding3Small,
    /// OpenAI text-embedding-3-large (3072 dimensions)
    TextEmbedding3Large,
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::TextEmbeddingAda002 => 1536,
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
        }
    }
}

impl std::str::FromStr for EmbeddingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text-embedding-ada-002" => Ok(EmbeddingModel::TextEmbeddingAda002),
            "text-embedding-3-small" => Ok(EmbeddingModel::TextEmbedding3Small),
            "text-embedding-3-large" => Ok(EmbeddingModel::TextEmbedding3Large),
            other => Err(format!("unsupported embedding model '{}'", other)),
        }
    }
}

/// Embedding result
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: u32,
}

/// Nearest-neighbour query sent to the vector index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub vector: Vec<f32>,
    pub top_k: u32,
    pub include_metadata: bool,
    pub namespace: String,
}

impl IndexQuery {
    pub fn new(vector: Vec<f32>, namespace: impl Into<String>) -> Self {
        Self {
            vector,
            top_k: TOP_K,
            include_metadata: true,
            namespace: namespace.into(),
        }
    }
}

/// Raw match as returned by the vector index
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Metadata stored alongside each professor vector
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ProfessorMetadata {
    name: String,
    subject: String,
    stars: f64,
    review: String,
}

/// A professor record retrieved for the current query
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalMatch {
    pub professor_name: String,
    pub subject: String,
    pub star_rating: f64,
    pub review_summary: String,
    pub similarity_score: f32,
}

impl TryFrom<IndexMatch> for RetrievalMatch {
    type Error = ChatError;

    fn try_from(m: IndexMatch) -> ChatResult<Self> {
        let metadata = m.metadata.ok_or_else(|| {
            ChatError::upstream(
                UpstreamService::VectorIndex,
                format!("match '{}' has no metadata", m.id),
            )
        })?;

        let professor: ProfessorMetadata = serde_json::from_value(metadata).map_err(|e| {
            ChatError::upstream(
                UpstreamService::VectorIndex,
                format!("match '{}' has malformed metadata: {}", m.id, e),
            )
        })?;

        Ok(Self {
            professor_name: professor.name,
            subject: professor.subject,
            star_rating: professor.stars,
            review_summary: professor.review,
            similarity_score: m.score,
        })
    }
}
