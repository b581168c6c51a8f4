use crate::routes::{chat_routes, health_routes};
use crate::{Result, UpstreamClient, WebError};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use parley_config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Shared state for the proxy routes
#[derive(Debug, Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let upstream = UpstreamClient::new(
            config.upstream_url.clone(),
            Duration::from_secs(config.upstream_connect_timeout_secs),
        )?;
        Ok(Self::new(upstream))
    }
}

/// Assemble the proxy router with CORS and the body limit applied.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(chat_routes(state.clone()))
        .merge(health_routes(state))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors)
}

pub async fn start_server(config: &ServerConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = build_router(state, config);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| WebError::Config(format!("Invalid address: {e}")))?;

    tracing::info!(upstream = %config.upstream_url, "Starting chat proxy on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(WebError::Io)?;

    axum::serve(listener, app).await.map_err(WebError::Io)?;

    Ok(())
}
