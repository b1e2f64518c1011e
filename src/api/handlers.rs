//! HTTPハンドラ
//!
//! multipartの受領と必須フィールド検証はここ（呼び出し元）の責務。
//! コアには検証済みのAnalysisRequestだけを渡す。

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::analyzer::AnalysisRequest;

use super::AppState;

const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: image (file) and userId are required";

/// GET /api/health
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "Soil AI Analysis API",
    }))
}

/// POST /api/analyze
///
/// multipartフィールド: image（ファイル、メモリ保持）、userId、
/// 任意のlat/lon。imageまたはuserIdの欠落は400
pub async fn analyze_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut user_id: Option<String> = None;
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("Invalid multipart payload: {}", e),
                )
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let mime_type = field.content_type().unwrap_or("image/jpeg").to_string();
                match field.bytes().await {
                    Ok(bytes) => image = Some((bytes.to_vec(), mime_type)),
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            &format!("Failed to read image: {}", e),
                        )
                    }
                }
            }
            "userId" => user_id = field.text().await.ok().filter(|id| !id.is_empty()),
            "lat" => lat = field.text().await.ok().and_then(|value| value.parse().ok()),
            "lon" => lon = field.text().await.ok().and_then(|value| value.parse().ok()),
            _ => {}
        }
    }

    let ((image, mime_type), user_id) = match (image, user_id) {
        (Some(image), Some(user_id)) => (image, user_id),
        _ => return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE),
    };

    tracing::info!("📥 Received image from user {}", user_id);

    let request = AnalysisRequest {
        image,
        mime_type,
        user_id,
        lat,
        lon,
    };

    match state.analyzer.analyze(request).await {
        Ok(analysis) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "analysis": analysis,
                "message": "Analysis completed successfully",
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Analysis error: {}", e);
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, &e.to_string())
        }
    }
}

/// 未定義ルート
pub async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Endpoint not found")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message,
        })),
    )
        .into_response()
}
