//! レスポンス正規化
//!
//! プロバイダの生ペイロードをSoilAnalysisReportへ変換する。
//! この操作は外へ失敗を漏らさない:
//! 1. 厳密抽出（JSONデコード）
//! 2. フォールバック抽出（キーワード走査）
//! 3. ハードデフォルト（固定の安全値 + errorフィールド）
//! の三段で必ずスキーマ充足のレポートを返す。

use chrono::Utc;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::fallback::{parse_text_response, DEFAULT_SOIL_CONDITION};
use crate::parser::parse_structured;
use crate::types::{ParsedAnalysis, ProviderResponse, SoilAnalysisReport, SoilInsights};

/// 推論元の固定識別子
pub const PROVIDER: &str = "google-gemini";

/// 欠損時に補完する推奨事項（通常経路）
const DEFAULT_RECOMMENDATIONS: &[&str] = &["Add organic matter", "Test soil pH"];

/// 欠損時に補完する推奨作物（通常経路）
const DEFAULT_CROPS: &[&str] = &["Legumes", "Cover crops"];

/// ハードデフォルトの推奨事項
const SAFE_RECOMMENDATIONS: &[&str] =
    &["Add organic compost", "Test soil pH", "Consider crop rotation"];

/// ハードデフォルトの推奨作物
const SAFE_CROPS: &[&str] = &["Legumes", "Green manure crops", "Cover crops"];

/// raw_textを復元できなかったときのプレースホルダ
const NO_RESPONSE_TEXT: &str = "No response text";

/// explanationに使う生成テキストの先頭文字数
const EXPLANATION_PREVIEW_CHARS: usize = 200;

/// プロバイダの生ペイロードを正規化する
///
/// # Arguments
/// * `raw` - generateContentの生レスポンス（未加工のJSON）
///
/// # Returns
/// 常に全フィールド充足のSoilAnalysisReport。内部でどんな失敗が
/// 起きてもハードデフォルトへ縮退し、panicも伝播もしない
pub fn normalize_response(raw: &Value) -> SoilAnalysisReport {
    match try_normalize(raw) {
        Ok(report) => report,
        Err(error) => hard_default(raw, &error.to_string()),
    }
}

/// 通常経路: テキスト抽出 → 厳密抽出 → フォールバック → 組み立て
fn try_normalize(raw: &Value) -> Result<SoilAnalysisReport> {
    let response: ProviderResponse = serde_json::from_value(raw.clone())?;

    let text = response
        .generated_text()
        .ok_or_else(|| Error::Parse("No response text from Gemini".into()))?;

    let parsed = parse_structured(text).unwrap_or_else(|_| parse_text_response(text));

    Ok(assemble(parsed, text, raw))
}

/// ParsedAnalysisから最終レポートを組み立てる
///
/// recommendations/suggested_cropsは空のまま返さない（既定値で補完）
fn assemble(parsed: ParsedAnalysis, text: &str, raw: &Value) -> SoilAnalysisReport {
    let issue = parsed
        .soil_condition
        .clone()
        .unwrap_or_else(|| DEFAULT_SOIL_CONDITION.to_string());

    let explanation = parsed
        .soil_condition
        .unwrap_or_else(|| text_preview(text));

    SoilAnalysisReport {
        provider: PROVIDER.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        detected_objects: parsed.detected_objects,
        soil_analysis: SoilInsights {
            issue,
            explanation,
            recommendations: non_empty_or(parsed.recommendations, DEFAULT_RECOMMENDATIONS),
            suggested_crops: non_empty_or(parsed.suggested_crops, DEFAULT_CROPS),
        },
        raw_response: Some(raw.clone()),
        raw_text: text.to_string(),
        error: None,
    }
}

/// ハードデフォルト: 固定の安全値で必ず有効なレポートを返す
///
/// raw_textはペイロードからベストエフォートで復元する
fn hard_default(raw: &Value, error: &str) -> SoilAnalysisReport {
    let raw_text = raw
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or(NO_RESPONSE_TEXT)
        .to_string();

    SoilAnalysisReport {
        provider: PROVIDER.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        detected_objects: vec![],
        soil_analysis: SoilInsights {
            issue: "Analysis completed".to_string(),
            explanation: "AI analysis completed successfully".to_string(),
            recommendations: owned(SAFE_RECOMMENDATIONS),
            suggested_crops: owned(SAFE_CROPS),
        },
        raw_response: None,
        raw_text,
        error: Some(error.to_string()),
    }
}

/// 生成テキストの先頭200文字 + 省略記号
fn text_preview(text: &str) -> String {
    let preview: String = text.chars().take(EXPLANATION_PREVIEW_CHARS).collect();
    format!("{}...", preview)
}

fn non_empty_or(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        owned(defaults)
    } else {
        values
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
