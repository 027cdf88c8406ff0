use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::provider::{ChatCompletionProvider, CompletionStream};
use super::sse::{SseDecoder, StreamEvent, parse_event};
use crate::config::OpenAIConfig;
use crate::error::{ChatError, ChatResult, UpstreamService};
use crate::models::Message;

/// OpenAI chat-completions client in streaming mode
pub struct OpenAIChatProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIChatProvider {
    /// No overall request timeout is set: an answer may stream for longer
    /// than the upstream timeout. It bounds connecting and the wait for the
    /// response headers instead.
    pub fn new(config: OpenAIConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

fn upstream(err: impl std::fmt::Display) -> ChatError {
    ChatError::upstream(UpstreamService::Completion, err)
}

#[async_trait]
impl ChatCompletionProvider for OpenAIChatProvider {
    async fn stream_chat(&self, messages: Vec<Message>) -> ChatResult<CompletionStream> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: &messages,
            stream: true,
        };

        let send = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send();

        let response = tokio::time::timeout(self.config.timeout, send)
            .await
            .map_err(|_| upstream("timed out waiting for response headers"))?
            .map_err(upstream)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(upstream(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        debug!(
            model = %self.config.chat_model,
            messages = messages.len(),
            "Completion stream opened"
        );

        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::default();
            let mut exhausted = false;

            while !exhausted {
                let events = match body.next().await {
                    Some(Ok(chunk)) => match decoder.push(&chunk) {
                        Ok(events) => events,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    },
                    Some(Err(e)) => {
                        yield Err(ChatError::Streaming(e.to_string()));
                        return;
                    }
                    None => {
                        exhausted = true;
                        decoder.finish()
                    }
                };

                for data in events {
                    match parse_event(&data) {
                        Ok(StreamEvent::Delta(text)) => yield Ok(text),
                        Ok(StreamEvent::Skip) => {}
                        Ok(StreamEvent::Done) => return,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
