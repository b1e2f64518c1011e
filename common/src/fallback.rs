//! フォールバック抽出（キーワード走査）
//!
//! 厳密抽出が失敗したとき、小文字化したテキストに固定順のルール表を
//! 適用してParsedAnalysisを再構成する。各ルールは独立に累積適用され、
//! soil_conditionのみ後勝ち（後のルールが上書き）とする。

use crate::types::{DetectedObject, ParsedAnalysis};

/// キーワード未検出時のsoil_condition初期値
pub const DEFAULT_SOIL_CONDITION: &str = "Soil condition analyzed";

/// キーワードルール
///
/// 判定順はこの表の並び順（clay→sand→rock→plant）で固定。
/// soil_conditionは後のルールが上書きするため、並び替え厳禁。
struct KeywordRule {
    keywords: &'static [&'static str],
    soil_condition: Option<&'static str>,
    recommendation: Option<&'static str>,
    crops: &'static [&'static str],
    detected_object: Option<(&'static str, f64)>,
}

const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["clay"],
        soil_condition: Some("Clay soil detected"),
        recommendation: Some("Add sand and organic matter for better drainage"),
        crops: &["Wheat", "Barley"],
        detected_object: None,
    },
    KeywordRule {
        keywords: &["sandy", "sand"],
        soil_condition: Some("Sandy soil detected"),
        recommendation: Some("Add compost to improve water retention"),
        crops: &["Carrots", "Radishes"],
        detected_object: None,
    },
    KeywordRule {
        keywords: &["rock", "stone"],
        soil_condition: None,
        recommendation: Some("Remove large rocks and debris"),
        crops: &[],
        detected_object: None,
    },
    KeywordRule {
        keywords: &["plant", "vegetation"],
        soil_condition: None,
        recommendation: None,
        crops: &["Tomatoes", "Lettuce"],
        detected_object: Some(("Vegetation", 0.8)),
    },
];

impl KeywordRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

/// 生成テキストをキーワード走査で解析する
///
/// # Arguments
/// * `text` - 生成テキスト（厳密抽出に失敗したもの）
///
/// # Returns
/// 再構成されたParsedAnalysis。キーワードが1つも無ければ
/// soil_conditionは既定値、他フィールドは空のまま
pub fn parse_text_response(text: &str) -> ParsedAnalysis {
    let lowered = text.to_lowercase();

    let mut analysis = ParsedAnalysis {
        soil_condition: Some(DEFAULT_SOIL_CONDITION.to_string()),
        ..ParsedAnalysis::default()
    };

    for rule in KEYWORD_RULES {
        if !rule.matches(&lowered) {
            continue;
        }
        if let Some(condition) = rule.soil_condition {
            analysis.soil_condition = Some(condition.to_string());
        }
        if let Some(recommendation) = rule.recommendation {
            analysis.recommendations.push(recommendation.to_string());
        }
        analysis
            .suggested_crops
            .extend(rule.crops.iter().map(|crop| crop.to_string()));
        if let Some((label, confidence)) = rule.detected_object {
            analysis.detected_objects.push(DetectedObject {
                label: label.to_string(),
                confidence,
            });
        }
    }

    analysis
}
