//! HTTP surface: routes, shared state and the server loop.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::{error, info};

use crate::config::{CatConfig, build_client};

mod views;

use views::{
    cat_handler, default_cat_handler, health_handler, list_cats_handler, random_cat_handler,
};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    config: Arc<CatConfig>,
    client: reqwest::Client,
}

impl AppState {
    fn new(config: CatConfig, client: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/cats", get(list_cats_handler))
        .route("/cats/", get(default_cat_handler))
        // static segment wins over the capture, so no cat can be called "random"
        .route("/cats/random", get(random_cat_handler))
        .route("/cats/{name}", get(cat_handler))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Binds the listener and serves until ctrl-c.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    config: CatConfig,
) -> Result<(), anyhow::Error> {
    let client = build_client()?;
    let app = create_router().with_state(AppState::new(config, client));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}
