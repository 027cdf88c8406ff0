//! Professor Recommendation Domain Library
//!
//! Retrieval-augmented chat over a corpus of professor reviews: the last
//! message of a conversation is embedded, the closest professors are fetched
//! from a vector index and appended to the prompt, and the model's answer is
//! streamed back to the client as it is generated.
//!
//! # Architecture
//!
//! ```text
//!                  POST /api/chat
//!                        │
//!               ┌────────▼────────┐
//!               │   ChatService   │  ← validate, retrieve, augment, relay
//!               └────────┬────────┘
//!          ┌─────────────┼──────────────────┐
//! ┌────────▼────────┐ ┌──▼──────────┐ ┌─────▼──────────────────┐
//! │EmbeddingProvider│ │ VectorIndex │ │ ChatCompletionProvider │
//! │    (trait)      │ │   (trait)   │ │        (trait)         │
//! └────────┬────────┘ └──┬──────────┘ └─────┬──────────────────┘
//!          │             │                  │
//! ┌────────▼────────┐ ┌──▼──────────┐ ┌─────▼──────────────────┐
//! │ OpenAIEmbedding │ │PineconeIndex│ │   OpenAIChatProvider   │
//! │    Provider     │ │             │ │    (SSE streaming)     │
//! └─────────────────┘ └─────────────┘ └────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_professors::{
//!     ChatService, OpenAIChatProvider, OpenAIConfig, OpenAIEmbeddingProvider, PineconeConfig,
//!     PineconeIndex,
//! };
//! use core_config::FromEnv;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let openai = OpenAIConfig::from_env()?;
//! let pinecone = PineconeConfig::from_env()?;
//!
//! let service = ChatService::new(
//!     Arc::new(OpenAIEmbeddingProvider::new(openai.clone())?),
//!     Arc::new(PineconeIndex::connect(pinecone).await?),
//!     Arc::new(OpenAIChatProvider::new(openai)?),
//! );
//!
//! let app = domain_professors::handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod index;
pub mod models;
pub mod prompt;
pub mod service;

// Re-export commonly used types
pub use completion::{ChatCompletionProvider, CompletionStream, OpenAIChatProvider};
pub use config::{OpenAIConfig, PineconeConfig};
pub use embedding::{EmbeddingProvider, OpenAIEmbeddingProvider};
pub use error::{ChatError, ChatResult, GENERIC_ERROR_MESSAGE, UpstreamService};
pub use handlers::ChatApiDoc;
pub use index::{PineconeIndex, VectorIndex};
pub use models::{
    Conversation, EmbeddingModel, EmbeddingResult, IndexMatch, IndexQuery, Message,
    RetrievalMatch, Role, TOP_K,
};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, PromptTemplate};
pub use service::ChatService;
