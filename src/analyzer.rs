//! 解析オーケストレーション
//!
//! 画像バイト列 → Base64エンコード → 推論呼び出し → 正規化の
//! 直列フロー。リクエスト間で状態を持たない。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use soil_ai_common::{normalize_response, SoilAnalysisReport};

use crate::error::Result;
use crate::gemini::GeminiClient;

/// 解析リクエスト
///
/// 画像バイト列はエンコード後に破棄される（リクエスト寿命）
#[derive(Debug)]
pub struct AnalysisRequest {
    pub image: Vec<u8>,
    pub mime_type: String,
    pub user_id: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// 土壌解析器
pub struct SoilAnalyzer {
    client: GeminiClient,
}

impl SoilAnalyzer {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// 画像を解析して正規化済みレポートを返す
    ///
    /// 推論呼び出しのエラー（キー未設定・429・転送障害）のみ伝播する。
    /// 正規化は決して失敗しない
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<SoilAnalysisReport> {
        if request.lat.is_some() || request.lon.is_some() {
            tracing::debug!(
                "位置情報: user={} lat={:?} lon={:?}",
                request.user_id,
                request.lat,
                request.lon
            );
        }

        let encoded = STANDARD.encode(&request.image);
        let raw = self.client.analyze_image(&encoded, &request.mime_type).await?;

        Ok(normalize_response(&raw))
    }
}
