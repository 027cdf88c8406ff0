mod chat;

use std::sync::Arc;

use axum::{Router, routing::post};
use utoipa::OpenApi;

use crate::models::{Message, Role};
use crate::service::ChatService;

/// OpenAPI documentation for the professor recommendation API
#[derive(OpenApi)]
#[openapi(
    paths(chat::chat),
    components(schemas(Message, Role)),
    tags(
        (name = "chat", description = "Retrieval-augmented professor recommendations")
    )
)]
pub struct ChatApiDoc;

/// Create the chat router; mount it under `/api`.
pub fn router(service: ChatService) -> Router {
    Router::new()
        .route("/chat", post(chat::chat))
        .with_state(Arc::new(service))
}
