use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Rate My Professor API",
        version = "0.1.0",
        description = "Retrieval-augmented professor recommendations streamed from a chat model"
    ),
    nest(
        (path = "/api", api = domain_professors::ChatApiDoc)
    )
)]
pub struct ApiDoc;
