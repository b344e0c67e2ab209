pub mod handlers;
pub mod rate_limit;
mod types;

pub use types::{AnalyzeForm, ErrorResponse, HealthResponse};

use crate::{
    Result,
    analysis::FraudAnalyzer,
    config::{Config, ServerConfig},
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use rate_limit::RateLimiter;
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub async fn run(config: Config) -> Result<()> {
    let analyzer = FraudAnalyzer::from_config(&config)?;

    let app_state = handlers::AppState {
        analyzer: Arc::new(analyzer),
    };

    let app = router(app_state, &config.server);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Builds the HTTP routes with per-route rate limits.
pub fn router(state: handlers::AppState, server: &ServerConfig) -> Router {
    let limits = &server.rate_limit;

    let mut index = Router::new().route("/", get(handlers::index));
    let mut health = Router::new().route("/healthz", get(handlers::healthz));
    let mut analyze = Router::new().route("/analyze", post(handlers::analyze));

    if limits.enabled {
        index = rate_limited(index, limits.index_per_minute);
        health = rate_limited(health, limits.health_per_minute);
        analyze = rate_limited(analyze, limits.analyze_per_minute);
    }

    let app = Router::new()
        .merge(index)
        .merge(health)
        .merge(analyze)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    if server.allow_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

fn rate_limited(router: Router<handlers::AppState>, per_minute: u32) -> Router<handlers::AppState> {
    let limiter = Arc::new(RateLimiter::per_minute(per_minute));
    router.route_layer(middleware::from_fn_with_state(limiter, rate_limit::enforce))
}
