//! 解析結果の型定義
//!
//! サーバーと正規化処理で共有される型:
//! - ProviderResponse: Gemini APIの生レスポンス（寛容なスキーマ）
//! - ParsedAnalysis: 生成テキストのベストエフォート解析結果
//! - SoilAnalysisReport: 呼び出し元へ返す最終出力（常に全フィールド充足）

use serde::{Deserialize, Deserializer, Serialize};

/// Gemini APIレスポンス
///
/// candidatesは0件でもよい。欠損フィールドはすべてデフォルトで埋め、
/// 走査は`generated_text`の明示的なOption連鎖で行う。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateContent {
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPart {
    pub text: Option<String>,
}

impl ProviderResponse {
    /// 先頭candidateの先頭partから生成テキストを取り出す
    ///
    /// # Returns
    /// テキストが存在すればSome、candidates/parts/textのいずれかが
    /// 欠けていればNone（エラーにはしない）
    pub fn generated_text(&self) -> Option<&str> {
        self.candidates.first()?.content.parts.first()?.text.as_deref()
    }
}

/// 検出オブジェクト
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectedObject {
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
}

/// 生成テキストの解析結果（中間表現）
///
/// 全フィールドが任意。欠損はエラーではなく、後段の組み立てで
/// 既定値に置き換えられる。recommendations/suggested_cropsは
/// 単一文字列でも1要素のリストに強制変換する。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParsedAnalysis {
    pub soil_condition: Option<String>,
    pub detected_objects: Vec<DetectedObject>,
    #[serde(deserialize_with = "string_or_list")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub suggested_crops: Vec<String>,
}

/// 単一文字列・文字列配列のどちらも受け付けるデシリアライザ
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    match Option::<StringOrList>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(StringOrList::One(value)) => Ok(vec![value]),
        Some(StringOrList::Many(values)) => Ok(values),
    }
}

/// 土壌所見（最終出力の内訳）
///
/// recommendations/suggested_cropsは空にならない（欠損時は既定値で補完）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilInsights {
    pub issue: String,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub suggested_crops: Vec<String>,
}

/// 土壌解析レポート（呼び出し元へ返す最終出力）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilAnalysisReport {
    /// 推論元の固定識別子
    pub provider: String,

    /// 正規化時刻（RFC 3339）
    pub timestamp: String,

    pub detected_objects: Vec<DetectedObject>,

    pub soil_analysis: SoilInsights,

    /// 監査用: プロバイダの生ペイロード（ハードデフォルト時は省略）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<serde_json::Value>,

    /// 監査用: 抽出した生成テキスト
    pub raw_text: String,

    /// ハードデフォルトへ縮退した場合のみ設定される
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // ProviderResponse テスト
    // =============================================

    #[test]
    fn test_provider_response_deserialize() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"soil_condition\": \"loamy\"}"
                    }]
                }
            }]
        }"#;

        let response: ProviderResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(
            response.generated_text(),
            Some("{\"soil_condition\": \"loamy\"}")
        );
    }

    #[test]
    fn test_provider_response_missing_candidates() {
        let response: ProviderResponse = serde_json::from_str("{}").expect("デシリアライズ失敗");
        assert!(response.candidates.is_empty());
        assert_eq!(response.generated_text(), None);
    }

    #[test]
    fn test_provider_response_empty_candidates() {
        let response: ProviderResponse =
            serde_json::from_str(r#"{"candidates": []}"#).expect("デシリアライズ失敗");
        assert_eq!(response.generated_text(), None);
    }

    #[test]
    fn test_provider_response_part_without_text() {
        let json = r#"{"candidates": [{"content": {"parts": [{}]}}]}"#;
        let response: ProviderResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(response.generated_text(), None);
    }

    #[test]
    fn test_provider_response_ignores_extra_fields() {
        // finishReason等の未知フィールドは無視する
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "ok"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 42}
        }"#;
        let response: ProviderResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(response.generated_text(), Some("ok"));
    }

    // =============================================
    // ParsedAnalysis テスト
    // =============================================

    #[test]
    fn test_parsed_analysis_full() {
        let json = r#"{
            "soil_condition": "loamy",
            "detected_objects": [{"label": "Rock", "confidence": 0.9}],
            "recommendations": ["Add mulch"],
            "suggested_crops": ["Corn"]
        }"#;

        let parsed: ParsedAnalysis = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(parsed.soil_condition.as_deref(), Some("loamy"));
        assert_eq!(parsed.detected_objects.len(), 1);
        assert_eq!(parsed.recommendations, vec!["Add mulch"]);
        assert_eq!(parsed.suggested_crops, vec!["Corn"]);
    }

    #[test]
    fn test_parsed_analysis_missing_fields() {
        let parsed: ParsedAnalysis = serde_json::from_str("{}").expect("デシリアライズ失敗");
        assert!(parsed.soil_condition.is_none());
        assert!(parsed.detected_objects.is_empty());
        assert!(parsed.recommendations.is_empty());
        assert!(parsed.suggested_crops.is_empty());
    }

    #[test]
    fn test_parsed_analysis_single_string_coercion() {
        // 単一文字列は1要素のリストへ強制変換
        let json = r#"{"recommendations": "Add compost", "suggested_crops": "Legumes"}"#;
        let parsed: ParsedAnalysis = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(parsed.recommendations, vec!["Add compost"]);
        assert_eq!(parsed.suggested_crops, vec!["Legumes"]);
    }

    #[test]
    fn test_parsed_analysis_null_fields() {
        let json = r#"{"soil_condition": null, "recommendations": null}"#;
        let parsed: ParsedAnalysis = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert!(parsed.soil_condition.is_none());
        assert!(parsed.recommendations.is_empty());
    }

    #[test]
    fn test_parsed_analysis_rejects_wrong_shape() {
        // スキーマ不一致は回復可能なエラー（フォールバック抽出の契機）
        let json = r#"{"recommendations": 42}"#;
        assert!(serde_json::from_str::<ParsedAnalysis>(json).is_err());
    }

    #[test]
    fn test_detected_object_default_confidence() {
        let object: DetectedObject =
            serde_json::from_str(r#"{"label": "Water"}"#).expect("デシリアライズ失敗");
        assert_eq!(object.label, "Water");
        assert_eq!(object.confidence, 0.0);
    }

    // =============================================
    // SoilAnalysisReport テスト
    // =============================================

    #[test]
    fn test_report_serialize_skips_absent_optionals() {
        let report = SoilAnalysisReport {
            provider: "google-gemini".to_string(),
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            detected_objects: vec![],
            soil_analysis: SoilInsights {
                issue: "Soil condition analyzed".to_string(),
                explanation: "Soil condition analyzed".to_string(),
                recommendations: vec!["Add organic matter".to_string()],
                suggested_crops: vec!["Legumes".to_string()],
            },
            raw_response: None,
            raw_text: "No response text".to_string(),
            error: None,
        };

        let json = serde_json::to_string(&report).expect("シリアライズ失敗");
        assert!(!json.contains("raw_response"));
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"provider\":\"google-gemini\""));
    }

    #[test]
    fn test_report_serialize_keeps_error_when_set() {
        let report = SoilAnalysisReport {
            provider: "google-gemini".to_string(),
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            detected_objects: vec![],
            soil_analysis: SoilInsights {
                issue: "Analysis completed".to_string(),
                explanation: "AI analysis completed successfully".to_string(),
                recommendations: vec!["Add organic compost".to_string()],
                suggested_crops: vec!["Legumes".to_string()],
            },
            raw_response: None,
            raw_text: "No response text".to_string(),
            error: Some("No response text from Gemini".to_string()),
        };

        let json = serde_json::to_string(&report).expect("シリアライズ失敗");
        assert!(json.contains("\"error\":\"No response text from Gemini\""));
    }
}
