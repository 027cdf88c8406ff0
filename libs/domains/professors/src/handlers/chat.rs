//! Streaming chat endpoint

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{ChatError, ChatResult, TEXT_PLAIN_UTF8};
use crate::models::{Conversation, Message};
use crate::service::{ChatService, relay};

/// Recommend professors for the last message of a conversation
///
/// The answer is streamed as plain text while the model generates it.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body(
        content = Vec<Message>,
        description = "Conversation so far; the last message is the query"
    ),
    responses(
        (status = 200, description = "Streamed recommendation", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed or empty conversation", body = String, content_type = "text/plain"),
        (status = 502, description = "Embedding, index or completion service failed", body = String, content_type = "text/plain")
    )
)]
#[instrument(name = "chat", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn chat(
    State(service): State<Arc<ChatService>>,
    payload: Result<Json<Vec<Message>>, JsonRejection>,
) -> Response {
    match open_stream(&service, payload).await {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)], body).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn open_stream(
    service: &ChatService,
    payload: Result<Json<Vec<Message>>, JsonRejection>,
) -> ChatResult<Body> {
    let Json(messages) =
        payload.map_err(|rejection| ChatError::InvalidJson(rejection.body_text()))?;
    let conversation = Conversation::try_from(messages)?;

    let stream = service.answer(conversation).await?;
    info!("Streaming completion to client");

    Ok(relay(stream))
}
