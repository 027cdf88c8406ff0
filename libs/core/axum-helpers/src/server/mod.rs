//! Server infrastructure module.
//!
//! - Router assembly with OpenAPI documentation and cross-cutting layers
//! - Health endpoint
//! - Graceful shutdown
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router, health_router};
//! use core_config::app_info;
//!
//! let router = create_router::<ApiDoc>(api_routes, &config.server)?;
//! let app = router.merge(health_router(app_info!()));
//! create_app(app, &config.server).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_cors_layer, create_router};
pub use health::{HealthResponse, health_router};
pub use shutdown::shutdown_signal;
