use async_trait::async_trait;

use crate::error::ChatResult;
use crate::models::{IndexMatch, IndexQuery};

/// Nearest-neighbour search over the professor review corpus.
///
/// Matches come back ordered by descending similarity, as ranked by the index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, query: IndexQuery) -> ChatResult<Vec<IndexMatch>>;
}
