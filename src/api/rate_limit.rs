//! 受信リクエストのレート制限
//!
//! クライアントIP単位のGCRA制限。固定ウィンドウ相当の上限
//! （既定: 15分あたり100件）をウィンドウ幅/件数のレートで近似する。

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovRateLimiter};
use serde_json::json;

use super::AppState;

/// IP別レートリミッタ
pub struct ApiRateLimiter {
    limiter: GovRateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>,
}

impl ApiRateLimiter {
    /// レートリミッタを構築する
    ///
    /// # Arguments
    /// * `max_requests` - ウィンドウあたりの最大リクエスト数
    /// * `window` - ウィンドウ幅
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let max = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::new(100).unwrap());
        let period = window
            .checked_div(max.get())
            .filter(|period| !period.is_zero())
            .unwrap_or(Duration::from_secs(9));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_minute(max))
            .allow_burst(max);

        Self {
            limiter: GovRateLimiter::keyed(quota),
        }
    }

    /// このIPのリクエストを許可するか
    pub fn check(&self, ip: IpAddr) -> bool {
        self.limiter.check_key(&ip).is_ok()
    }
}

/// `/api/*` に適用するレート制限ミドルウェア
///
/// 接続情報が無い場合（テスト等）はループバック扱い
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or_else(|| IpAddr::from([127, 0, 0, 1]));

    if !state.limiter.check(ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "error": "Too many requests from this IP, please try again later."
            })),
        )
            .into_response();
    }

    next.run(request).await
}
