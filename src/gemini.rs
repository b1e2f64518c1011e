//! Gemini API連携
//!
//! generateContentへの単一呼び出しを構築・発行する。
//! リトライもキャッシュも行わない（リトライは呼び出し元の方針）。

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use soil_ai_common::SOIL_ANALYSIS_PROMPT;

use crate::config::Config;
use crate::error::{Result, SoilAiError};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

/// 土壌解析リクエストを構築
///
/// プロンプト + inline画像データ + 固定の生成パラメータ
fn build_request(base64_image: &str, mime_type: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text {
                    text: SOIL_ANALYSIS_PROMPT.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.to_string(),
                        data: base64_image.to_string(),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: 0.4,
            top_k: 32,
            top_p: 1.0,
            max_output_tokens: 2048,
        },
    }
}

/// Gemini APIクライアント
///
/// プロセス起動時に設定から一度だけ構築し、リクエスト間で
/// 可変状態を共有しない
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiClient {
    /// クライアントを構築する
    ///
    /// タイムアウトはクライアント全体に適用される（既定30秒）
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SoilAiError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/{}:generateContent", GEMINI_API_BASE, config.model),
        })
    }

    /// 画像を解析に送る
    ///
    /// # Arguments
    /// * `base64_image` - Base64エンコード済みの画像データ
    /// * `mime_type` - 画像のMIMEタイプ（例: "image/jpeg"）
    ///
    /// # Returns
    /// * `Ok(Value)` - プロバイダの生ペイロード（未加工のまま返す）
    /// * `Err(MissingApiKey)` - キー未設定。ネットワーク呼び出しは行われない
    /// * `Err(RateLimited)` - HTTP 429
    /// * `Err(Inference)` - その他の転送・プロバイダ障害
    pub async fn analyze_image(&self, base64_image: &str, mime_type: &str) -> Result<Value> {
        let api_key = self.api_key.as_deref().ok_or(SoilAiError::MissingApiKey)?;

        let request = build_request(base64_image, mime_type);
        let url = format!("{}?key={}", self.endpoint, api_key);

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SoilAiError::Inference(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SoilAiError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(SoilAiError::Inference(format!(
                "provider returned status {}: {}",
                status, preview
            )));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| SoilAiError::Inference(e.to_string()))?;

        tracing::debug!("Gemini response: {}", raw);

        Ok(raw)
    }
}
