//! エラー型定義
//!
//! 呼び出し元へ伝播するのは推論呼び出し側のエラーのみ。
//! 正規化側の失敗はSoilAnalysisReportへ吸収され、ここには現れない。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoilAiError {
    /// APIキー未設定。ネットワーク呼び出し前に検出される
    #[error("Google Gemini API key not configured")]
    MissingApiKey,

    #[error("Config error: {0}")]
    Config(String),

    /// プロバイダのスロットリング（HTTP 429）
    #[error("AI service rate limit exceeded. Please try again later.")]
    RateLimited,

    /// その他の転送・プロバイダ障害（タイムアウト、非2xx、不正ボディ）
    #[error("AI analysis failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SoilAiError {
    /// HTTPレイヤでのステータスコード対応
    pub fn status_code(&self) -> u16 {
        match self {
            SoilAiError::RateLimited => 429,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, SoilAiError>;
