//! 設定
//!
//! 環境変数（.env対応）から起動時に一度だけ読み込む。
//! APIキーは起動時には任意で、推論呼び出し時に検証される。

use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    /// 待ち受けポート
    pub port: u16,
    /// Gemini APIキー（未設定でも起動は可能）
    pub api_key: Option<String>,
    /// 使用モデル
    pub model: String,
    /// 推論呼び出しのタイムアウト（秒）
    pub timeout_seconds: u64,
    /// レート制限: ウィンドウあたりの最大リクエスト数
    pub rate_limit_max_requests: u32,
    /// レート制限: ウィンドウ幅（分）
    pub rate_limit_window_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            api_key: None,
            model: "gemini-2.5-flash".into(),
            timeout_seconds: 30,
            rate_limit_max_requests: 100,
            rate_limit_window_minutes: 15,
        }
    }
}

impl Config {
    /// 環境変数から設定を構築する。不正な値は既定値にフォールバック
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT", defaults.port),
            api_key: non_empty_var("GOOGLE_GEMINI_API_KEY"),
            model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.model),
            timeout_seconds: env_parse("REQUEST_TIMEOUT_SECS", defaults.timeout_seconds),
            rate_limit_max_requests: env_parse(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window_minutes: env_parse(
                "RATE_LIMIT_WINDOW_MINUTES",
                defaults.rate_limit_window_minutes,
            ),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.rate_limit_window_minutes, 15);
    }

    #[test]
    fn test_env_parse_fallback_on_garbage() {
        // 未設定の変数は既定値へ
        assert_eq!(env_parse("SOIL_AI_TEST_UNSET_VAR", 42u16), 42);
    }
}
