//! End-to-end request flow through the router with in-process upstream stubs.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use domain_professors::{
    ChatCompletionProvider, ChatError, ChatResult, ChatService, CompletionStream, EmbeddingModel,
    EmbeddingProvider, EmbeddingResult, GENERIC_ERROR_MESSAGE, IndexMatch, IndexQuery, Message,
    Role, UpstreamService, VectorIndex, handlers,
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

#[derive(Default)]
struct StubEmbedder {
    inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, _model: EmbeddingModel, text: &str) -> ChatResult<EmbeddingResult> {
        self.inputs.lock().unwrap().push(text.to_string());
        Ok(EmbeddingResult {
            values: vec![0.01; 1536],
            dimension: 1536,
            tokens_used: 6,
        })
    }
}

#[derive(Default)]
struct StubIndex {
    queries: Mutex<Vec<IndexQuery>>,
}

#[async_trait]
impl VectorIndex for StubIndex {
    async fn query(&self, query: IndexQuery) -> ChatResult<Vec<IndexMatch>> {
        self.queries.lock().unwrap().push(query);
        Ok([
            ("Dr. Linda Johnson", 5.0, "Very approachable."),
            ("Dr. Emily White", 4.0, "Great teacher but fast."),
            ("Dr. Sarah Taylor", 3.0, "Lectures can be dry."),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, stars, review))| IndexMatch {
            id: format!("prof-{}", i),
            score: 0.9 - i as f32 * 0.1,
            metadata: Some(json!({
                "name": name,
                "subject": "Chemistry",
                "stars": stars,
                "review": review,
            })),
        })
        .collect())
    }
}

struct StubCompletion {
    tokens: Vec<&'static str>,
    prompts: Mutex<Vec<Vec<Message>>>,
}

#[async_trait]
impl ChatCompletionProvider for StubCompletion {
    async fn stream_chat(&self, messages: Vec<Message>) -> ChatResult<CompletionStream> {
        self.prompts.lock().unwrap().push(messages);
        let items: Vec<ChatResult<String>> =
            self.tokens.iter().map(|t| Ok(t.to_string())).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _model: EmbeddingModel, _text: &str) -> ChatResult<EmbeddingResult> {
        Err(ChatError::upstream(UpstreamService::Embedding, "429 Too Many Requests"))
    }
}

fn chat_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_chemistry_query_end_to_end() {
    let embedder = Arc::new(StubEmbedder::default());
    let index = Arc::new(StubIndex::default());
    let completion = Arc::new(StubCompletion {
        tokens: vec!["Dr. Linda Johnson", "\nSubject: Chemistry", "\nRating: 5/5"],
        prompts: Mutex::new(Vec::new()),
    });

    let app = handlers::router(ChatService::new(
        embedder.clone(),
        index.clone(),
        completion.clone(),
    ));

    let response = app
        .oneshot(chat_request(json!([
            {"role": "user", "content": "I need a Chemistry professor"}
        ])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "Dr. Linda Johnson\nSubject: Chemistry\nRating: 5/5"
    );

    assert_eq!(
        *embedder.inputs.lock().unwrap(),
        vec!["I need a Chemistry professor".to_string()]
    );

    let queries = index.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].top_k, 3);
    assert!(queries[0].include_metadata);

    let prompts = completion.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert_eq!(prompt.len(), 2);
    assert_eq!(prompt[0].role, Role::System);
    assert_eq!(prompt[1].role, Role::User);

    let augmented = &prompt[1].content;
    assert!(augmented.starts_with("I need a Chemistry professor"));
    for expected in [
        "Professor 1: Dr. Linda Johnson",
        "Professor 2: Dr. Emily White",
        "Professor 3: Dr. Sarah Taylor",
        "Rating: 5/5",
        "Rating: 4/5",
        "Rating: 3/5",
    ] {
        assert!(augmented.contains(expected), "missing {:?}", expected);
    }
}

#[tokio::test]
async fn test_history_is_forwarded_unchanged() {
    let completion = Arc::new(StubCompletion {
        tokens: vec!["ok"],
        prompts: Mutex::new(Vec::new()),
    });
    let app = handlers::router(ChatService::new(
        Arc::new(StubEmbedder::default()),
        Arc::new(StubIndex::default()),
        completion.clone(),
    ));

    let history = json!([
        {"role": "system", "content": "Client supplied context"},
        {"role": "user", "content": "Hi"},
        {"role": "assistant", "content": "Hello! How can I help you today?"},
        {"role": "user", "content": "Any good Physics professors?"}
    ]);
    let response = app.oneshot(chat_request(history)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.into_body().collect().await.unwrap();

    let prompts = completion.prompts.lock().unwrap();
    let prompt = &prompts[0];
    assert_eq!(prompt.len(), 5);
    assert_eq!(prompt[1], Message::system("Client supplied context"));
    assert_eq!(prompt[2], Message::user("Hi"));
    assert_eq!(
        prompt[3],
        Message::assistant("Hello! How can I help you today?")
    );
    assert!(prompt[4].content.starts_with("Any good Physics professors?"));
}

#[tokio::test]
async fn test_embedding_failure_returns_generic_error() {
    let completion = Arc::new(StubCompletion {
        tokens: vec!["never"],
        prompts: Mutex::new(Vec::new()),
    });
    let index = Arc::new(StubIndex::default());
    let app = handlers::router(ChatService::new(
        Arc::new(FailingEmbedder),
        index.clone(),
        completion.clone(),
    ));

    let response = app
        .oneshot(chat_request(json!([{"role": "user", "content": "Math"}])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], GENERIC_ERROR_MESSAGE.as_bytes());
    assert!(index.queries.lock().unwrap().is_empty());
    assert!(completion.prompts.lock().unwrap().is_empty());
}
