//! Decoding of the `text/event-stream` body of a streaming chat completion.

use serde::Deserialize;

use crate::error::{ChatError, ChatResult, UpstreamService};

const DONE_MARKER: &str = "[DONE]";

/// Largest unterminated event kept in memory before the stream is abandoned.
pub const MAX_PENDING_BYTES: usize = 1 << 20;

/// Incremental server-sent-events decoder.
///
/// Network chunks may split an event (or a UTF-8 sequence) anywhere, so bytes
/// are buffered until a blank line terminates the event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already searched for a terminator.
    scanned: usize,
}

impl SseDecoder {
    /// Feed a chunk and return the `data` payloads of every completed event.
    ///
    /// Fails once an unterminated event grows past [`MAX_PENDING_BYTES`].
    pub fn push(&mut self, chunk: &[u8]) -> ChatResult<Vec<String>> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        loop {
            // Back up one byte: the previous push may have ended on the first '\n'
            let from = self.scanned.saturating_sub(1);
            match find_event_end(&self.buffer[from..]) {
                Some(offset) => {
                    let pos = from + offset;
                    let raw: Vec<u8> = self.buffer.drain(..pos + 2).collect();
                    self.scanned = 0;
                    if let Some(data) = event_data(&raw[..pos]) {
                        events.push(data);
                    }
                }
                None => {
                    self.scanned = self.buffer.len();
                    break;
                }
            }
        }

        if self.buffer.len() > MAX_PENDING_BYTES {
            return Err(ChatError::Streaming(format!(
                "event exceeds {} bytes without a terminator",
                MAX_PENDING_BYTES
            )));
        }

        Ok(events)
    }

    /// Flush a trailing event the server did not terminate.
    pub fn finish(&mut self) -> Vec<String> {
        let raw = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        event_data(&raw).into_iter().collect()
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Join the `data:` lines of one event; comments and other fields are ignored.
fn event_data(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Meaning of one decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Done,
    /// Role announcements, empty deltas, finish markers.
    Skip,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: String,
}

pub fn parse_event(data: &str) -> ChatResult<StreamEvent> {
    let data = data.trim();
    if data == DONE_MARKER {
        return Ok(StreamEvent::Done);
    }

    let chunk: CompletionChunk = serde_json::from_str(data)
        .map_err(|e| ChatError::Streaming(format!("malformed completion chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(ChatError::upstream(UpstreamService::Completion, error.message));
    }

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty());

    Ok(content.map_or(StreamEvent::Skip, StreamEvent::Delta))
}
