use std::net::SocketAddr;
use std::time::{Duration, Instant};

use sea_orm::Database;
use tracing::info;

use codegate::config::CodegateConfig;
use codegate::rate_limit::VerifyRateLimiter;
use codegate::router::build_router;
use codegate::state::AppState;
use codegate_core::config::Config;
use codegate_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = CodegateConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let verify_limiter = VerifyRateLimiter::per_minute(config.verify_rate_limit_per_minute);
    let sweeper = verify_limiter.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            sweeper.evict_idle(Instant::now());
        }
    });

    let state = AppState {
        db,
        signature_window_secs: config.signature_window_secs,
        max_body_bytes: config.max_body_bytes,
        code_length: config.code_length,
        verify_limiter,
    };

    let router = build_router(state, config.request_timeout_secs);
    let addr = format!("0.0.0.0:{}", config.codegate_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("codegate listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
