use std::sync::Arc;

use axum_helpers::server::{create_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_professors::{
    ChatService, OpenAIChatProvider, OpenAIEmbeddingProvider, PineconeIndex, handlers,
};
use tracing::{info, warn};

mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first so configuration errors are reported nicely
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let embedder = OpenAIEmbeddingProvider::new(config.openai.clone())?;
    let completion = OpenAIChatProvider::new(config.openai.clone())?;

    info!(index = %config.pinecone.index_name, "Connecting to Pinecone");
    let index = PineconeIndex::connect(config.pinecone.clone()).await?;

    let embedding_model = config.openai.embedding_model;
    if let Some(dimension) = index.dimension() {
        if dimension != embedding_model.dimension() {
            warn!(
                index_dimension = dimension,
                model = embedding_model.model_name(),
                model_dimension = embedding_model.dimension(),
                "Embedding model dimension does not match the index"
            );
        }
    }

    let service = ChatService::new(Arc::new(embedder), Arc::new(index), Arc::new(completion))
        .with_prompt(config.prompt.clone())
        .with_embedding_model(embedding_model)
        .with_namespace(config.pinecone.namespace.clone());

    let router = create_router::<openapi::ApiDoc>(handlers::router(service), &config.server)?;
    let app = router.merge(health_router(config.app.clone()));

    info!(
        name = config.app.name,
        version = config.app.version,
        chat_model = %config.openai.chat_model,
        "Starting professor recommendation API"
    );

    create_app(app, &config.server).await?;

    info!("Shutdown complete");
    Ok(())
}
