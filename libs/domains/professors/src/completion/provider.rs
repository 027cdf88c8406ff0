use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ChatResult;
use crate::models::Message;

/// Ordered text deltas of one completion. An `Err` item ends the stream.
pub type CompletionStream = BoxStream<'static, ChatResult<String>>;

/// Streaming chat-completion backend
///
/// The outer result covers everything up to the first byte of the answer
/// (connection, authentication, HTTP status). Failures after that surface
/// as an `Err` item inside the stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompletionProvider: Send + Sync {
    async fn stream_chat(&self, messages: Vec<Message>) -> ChatResult<CompletionStream>;
}
