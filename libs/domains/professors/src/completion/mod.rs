mod openai;
mod provider;
mod sse;

pub use openai::OpenAIChatProvider;
pub use provider::{ChatCompletionProvider, CompletionStream};
pub use sse::{MAX_PENDING_BYTES, SseDecoder, StreamEvent, parse_event};

#[cfg(test)]
pub use provider::MockChatCompletionProvider;
