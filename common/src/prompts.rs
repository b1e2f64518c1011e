//! プロンプト定義
//!
//! 土壌解析の固定プロンプト。5つの観点とJSON形式の回答
//! （フィールド名付き）を要求する。

/// 土壌解析プロンプト
pub const SOIL_ANALYSIS_PROMPT: &str = "Analyze this soil/land image and provide detailed information about: \
1) Soil condition and health, \
2) Detected objects (plants, rocks, water, etc.), \
3) Soil type indicators, \
4) Recommendations for soil improvement, \
5) Suggested crops that would grow well. \
Provide a structured JSON response with fields: soil_condition, detected_objects, soil_type, recommendations, suggested_crops, confidence_score.";
