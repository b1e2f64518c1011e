//! Soil AI Common Library
//!
//! サーバー本体から分離した純粋ロジック（型・パース・正規化）

pub mod error;
pub mod fallback;
pub mod normalizer;
pub mod parser;
pub mod prompts;
pub mod types;

pub use error::{Error, Result};
pub use fallback::parse_text_response;
pub use normalizer::{normalize_response, PROVIDER};
pub use parser::{extract_json_object, parse_structured};
pub use prompts::SOIL_ANALYSIS_PROMPT;
pub use types::{
    DetectedObject, ParsedAnalysis, ProviderResponse, SoilAnalysisReport, SoilInsights,
};
