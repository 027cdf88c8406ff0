use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_helpers::ErrorCode;
use core_config::ConfigError;
use thiserror::Error;

/// Body returned for every failure that happens before streaming starts.
pub const GENERIC_ERROR_MESSAGE: &str = "Error occurred";

pub(crate) const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// External service a request depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamService {
    Embedding,
    VectorIndex,
    Completion,
}

impl UpstreamService {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamService::Embedding => "embedding",
            UpstreamService::VectorIndex => "vector index",
            UpstreamService::Completion => "chat completion",
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            UpstreamService::Embedding => ErrorCode::EmbeddingFailure,
            UpstreamService::VectorIndex => ErrorCode::VectorIndexFailure,
            UpstreamService::Completion => ErrorCode::CompletionFailure,
        }
    }
}

impl std::fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("{service} service error: {message}")]
    Upstream {
        service: UpstreamService,
        message: String,
    },

    #[error("Stream interrupted: {0}")]
    Streaming(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    pub fn upstream(service: UpstreamService, err: impl std::fmt::Display) -> Self {
        ChatError::Upstream {
            service,
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::BadRequest(_) | ChatError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ChatError::Upstream { .. } | ChatError::Streaming(_) => StatusCode::BAD_GATEWAY,
            ChatError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ChatError::BadRequest(_) => ErrorCode::InvalidRequest,
            ChatError::InvalidJson(_) => ErrorCode::InvalidJson,
            ChatError::Upstream { service, .. } => service.error_code(),
            ChatError::Streaming(_) => ErrorCode::StreamInterrupted,
            ChatError::Config(_) => ErrorCode::ConfigError,
        }
    }
}

impl From<ConfigError> for ChatError {
    fn from(err: ConfigError) -> Self {
        ChatError::Config(err.to_string())
    }
}

/// Pre-stream failures: full detail goes to the log, the client only sees
/// the generic message.
impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), error = %code, "{}", self);
        } else {
            tracing::info!(error_code = code.code(), error = %code, "{}", self);
        }

        (
            status,
            [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
            GENERIC_ERROR_MESSAGE,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ChatError::BadRequest("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ChatError::upstream(UpstreamService::VectorIndex, "timeout").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ChatError::Config("missing key".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_message_names_service() {
        let err = ChatError::upstream(UpstreamService::Embedding, "401 Unauthorized");
        assert_eq!(
            err.to_string(),
            "embedding service error: 401 Unauthorized"
        );
        assert_eq!(err.error_code(), ErrorCode::EmbeddingFailure);
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ChatError = ConfigError::MissingEnvVar("OPENAI_API_KEY".into()).into();
        assert!(matches!(err, ChatError::Config(ref m) if m.contains("OPENAI_API_KEY")));
    }

    #[tokio::test]
    async fn test_response_hides_internal_detail() {
        let response =
            ChatError::upstream(UpstreamService::Completion, "secret upstream detail")
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], GENERIC_ERROR_MESSAGE.as_bytes());
    }
}
