use async_trait::async_trait;

use crate::error::ChatResult;
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Trait for embedding generation providers
///
/// Turns the active query into the vector used for similarity search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, model: EmbeddingModel, text: &str) -> ChatResult<EmbeddingResult>;
}
