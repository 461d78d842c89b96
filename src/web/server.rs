//! Web server for graph browsing
//!
//! Provides an HTTP server using Axum to serve rendered graphs
//! and JSON API endpoints.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::processor::FileGraph;

use super::routes;

/// Shared application state
pub struct AppState {
    /// Processed graphs keyed by data name
    pub graphs: BTreeMap<String, FileGraph>,
    /// HTML template used to render graph pages
    pub template: String,
}

impl AppState {
    pub fn new(graphs: Vec<FileGraph>, template: String) -> Self {
        Self {
            graphs: graphs
                .into_iter()
                .map(|g| (g.data_name.clone(), g))
                .collect(),
            template,
        }
    }
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            open_browser: true,
        }
    }
}

/// Build the application router
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .merge(routes::page_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server and serve the processed graphs
pub async fn start_server(
    graphs: Vec<FileGraph>,
    template: String,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(AppState::new(graphs, template));
    let app = app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", config.port);
    info!("Starting web server at {}", url);

    if config.open_browser {
        info!("Opening browser...");
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
            warn!("Please open {} manually", url);
        }
    }

    info!("Press Ctrl+C to stop the server");

    axum::serve(listener, app).await?;

    Ok(())
}
