//! Web server implementation using axum

use anyhow::Result;
use axum::http::{HeaderName, Method};
use axum::routing::{delete, get};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use quotawatch_core::config::Settings;
use quotawatch_core::{Aggregator, CredentialStore};

use super::api::{self, ApiState};
use super::static_files;

/// Web server for the dashboard and the JSON API
pub struct WebServer {
    settings: Settings,
    store: Arc<dyn CredentialStore>,
    aggregator: Arc<Aggregator>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(
        settings: Settings,
        store: Arc<dyn CredentialStore>,
        aggregator: Arc<Aggregator>,
    ) -> Self {
        Self {
            settings,
            store,
            aggregator,
        }
    }

    /// Start the web server in a background task
    pub fn start(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }

    /// Run the web server
    async fn run(self) -> Result<()> {
        let port = self.settings.web.port;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let api_state = Arc::new(ApiState {
            store: self.store.clone(),
            aggregator: self.aggregator.clone(),
        });

        // The dashboard is same-origin; CORS stays open so the snapshot can
        // also be scraped by other tools on the LAN.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([HeaderName::from_static("content-type")]);

        // API routes
        let api_routes = Router::new()
            .route("/usage", get(api::get_usage))
            .route(
                "/credentials",
                get(api::list_credentials).post(api::add_credential),
            )
            .route("/credentials/{id}", delete(api::delete_credential))
            .with_state(api_state);

        // Static file routes for the embedded dashboard
        let static_routes = Router::new()
            .route("/", get(static_files::index))
            .route("/{*path}", get(static_files::asset));

        // Combine all routes
        let app = Router::new()
            .nest("/api", api_routes)
            .merge(static_routes)
            .layer(cors);

        tracing::info!("Web server starting on http://0.0.0.0:{}", port);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
