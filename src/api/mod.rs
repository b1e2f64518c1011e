//! HTTPレイヤ（薄い配管）
//!
//! ルーティング・CORS・ボディ上限・レート制限と、コアのエラー種別から
//! HTTPステータスへの変換のみを担う。解析の中身はanalyzer/common側。

pub mod handlers;
pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analyzer::SoilAnalyzer;
use crate::config::Config;
use self::rate_limit::ApiRateLimiter;

/// アップロードボディの上限（10MB）
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SoilAnalyzer>,
    pub limiter: Arc<ApiRateLimiter>,
}

impl AppState {
    pub fn new(analyzer: SoilAnalyzer, config: &Config) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            limiter: Arc::new(ApiRateLimiter::new(
                config.rate_limit_max_requests,
                Duration::from_secs(config.rate_limit_window_minutes * 60),
            )),
        }
    }
}

/// ルーター構築
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_handler))
        .route("/api/analyze", post(handlers::analyze_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .fallback(handlers::not_found_handler)
        .with_state(state)
}
