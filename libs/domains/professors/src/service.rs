use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Instrument, debug, info, warn};

use crate::completion::{ChatCompletionProvider, CompletionStream};
use crate::config::DEFAULT_PINECONE_NAMESPACE;
use crate::embedding::EmbeddingProvider;
use crate::error::{ChatError, ChatResult};
use crate::index::VectorIndex;
use crate::models::{Conversation, EmbeddingModel, IndexQuery, RetrievalMatch};
use crate::prompt::PromptTemplate;

/// Chunks buffered between the upstream reader and the client writer.
const RELAY_BUFFER: usize = 16;

/// Retrieval-augmented professor recommendation pipeline
pub struct ChatService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    completion: Arc<dyn ChatCompletionProvider>,
    prompt: PromptTemplate,
    embedding_model: EmbeddingModel,
    namespace: String,
}

impl ChatService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        completion: Arc<dyn ChatCompletionProvider>,
    ) -> Self {
        Self {
            embedder,
            index,
            completion,
            prompt: PromptTemplate::default(),
            embedding_model: EmbeddingModel::default(),
            namespace: DEFAULT_PINECONE_NAMESPACE.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_embedding_model(mut self, model: EmbeddingModel) -> Self {
        self.embedding_model = model;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Embed the query text and fetch the closest professor records.
    pub async fn retrieve(&self, query: &str) -> ChatResult<Vec<RetrievalMatch>> {
        let embedding = self.embedder.embed(self.embedding_model, query).await?;

        let matches = self
            .index
            .query(IndexQuery::new(embedding.values, self.namespace.as_str()))
            .await?;

        matches.into_iter().map(RetrievalMatch::try_from).collect()
    }

    /// Run retrieval and open the completion stream.
    ///
    /// Every error returned here happens before any answer text exists.
    pub async fn answer(&self, conversation: Conversation) -> ChatResult<CompletionStream> {
        let started = Instant::now();
        let matches = self.retrieve(&conversation.query().content).await?;

        info!(
            messages = conversation.message_count(),
            matches = matches.len(),
            retrieval_ms = started.elapsed().as_millis() as u64,
            "Retrieved professors for query"
        );
        for (rank, professor) in matches.iter().enumerate() {
            debug!(
                rank = rank + 1,
                professor = %professor.professor_name,
                score = professor.similarity_score,
                "Retrieval match"
            );
        }

        let (history, query) = conversation.into_parts();
        let messages = self.prompt.build_messages(history, &query, &matches);

        self.completion.stream_chat(messages).await
    }
}

/// Forward completion deltas to the client as they arrive.
///
/// A pump task writes into a bounded channel that backs the response body,
/// so a slow client slows the upstream read. When the client goes away the
/// send fails, the task exits and the upstream stream is dropped. An upstream
/// failure becomes a body error, which aborts the chunked response.
pub fn relay(mut stream: CompletionStream) -> Body {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(RELAY_BUFFER);

    tokio::spawn(async move {
        let mut deltas = 0usize;

        while let Some(item) = stream.next().await {
            let frame = match item {
                Ok(text) => Ok(Bytes::from(text)),
                Err(e) => {
                    warn!(error = %e, deltas, "Completion stream failed mid-response");
                    Err(std::io::Error::other(interrupted(e)))
                }
            };
            let failed = frame.is_err();

            if tx.send(frame).await.is_err() {
                debug!(deltas, "Client disconnected, dropping completion stream");
                return;
            }
            if failed {
                return;
            }
            deltas += 1;
        }

        debug!(deltas, "Completion stream finished");
    }
    .in_current_span());

    Body::from_stream(ReceiverStream::new(rx))
}

/// Mid-response failure as reported on the body; `Streaming` passes through as is.
fn interrupted(err: ChatError) -> ChatError {
    match err {
        ChatError::Streaming(_) => err,
        other => ChatError::Streaming(other.to_string()),
    }
}
