mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    sinks::{GotifyClient, Notifier},
};

pub struct Server {
    notifier: Arc<dyn Notifier>,
}

impl Server {
    pub fn new(_config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Server that forwards to the Gotify instance named in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(GotifyClient::new(&config.gotify)))
    }

    pub fn build_router(self) -> Router {
        let state = Arc::new(self);

        Router::new()
            .route("/webhook", post(routes::webhook))
            .route("/health", get(routes::health))
            .route("/metrics", get(routes::metrics_text))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn start(self, addr: &str) -> crate::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.build_router()).await?;
        Ok(())
    }
}
