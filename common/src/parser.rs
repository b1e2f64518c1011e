//! APIレスポンスパーサー
//!
//! 生成テキストからJSONオブジェクトを抽出し、ParsedAnalysisへ
//! デコードする。失敗は回復可能なシグナルであり、呼び出し側の
//! フォールバック抽出（キーワード走査）の契機になる。

use crate::error::{Error, Result};
use crate::types::ParsedAnalysis;

/// 生成テキストからJSONオブジェクト部分を抽出
///
/// 最初の`{`から最後の`}`までを貪欲に切り出す。テキスト中に複数の
/// JSON断片があると誤抽出しうるが、切り出し結果のデコード失敗は
/// フォールバックで吸収されるため、この単純な方式を維持している。
///
/// # Arguments
/// * `text` - 生成テキスト
///
/// # Returns
/// * `Ok(&str)` - 抽出されたJSON文字列
/// * `Err` - braceが見つからない場合
///
/// # Examples
/// ```
/// use soil_ai_common::extract_json_object;
///
/// let text = "Here is the result: {\"soil_condition\": \"loamy\"} done.";
/// let json = extract_json_object(text).unwrap();
/// assert_eq!(json, "{\"soil_condition\": \"loamy\"}");
/// ```
pub fn extract_json_object(text: &str) -> Result<&str> {
    let start = text
        .find('{')
        .ok_or_else(|| Error::Parse("No JSON found in response".into()))?;
    let end = text
        .rfind('}')
        .filter(|&end| end >= start)
        .ok_or_else(|| Error::Parse("No JSON found in response".into()))?;
    Ok(&text[start..=end])
}

/// 厳密抽出: 生成テキストをParsedAnalysisへデコード
///
/// # Arguments
/// * `text` - 生成テキスト
///
/// # Returns
/// * `Ok(ParsedAnalysis)` - 抽出・デコード成功
/// * `Err` - JSONが見つからないかスキーマ不一致
pub fn parse_structured(text: &str) -> Result<ParsedAnalysis> {
    let json_str = extract_json_object(text)?;
    let parsed: ParsedAnalysis = serde_json::from_str(json_str.trim())?;
    Ok(parsed)
}
