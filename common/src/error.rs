//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 生成テキストから解析可能なデータを取り出せなかった
    #[error("{0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
