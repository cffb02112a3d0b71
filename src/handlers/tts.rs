use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::core::speech::SynthesisOptions;
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for the synthesis endpoint.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    text: Option<String>,
    /// Voice selector, defaults to the emotional female voice.
    voice: Option<u8>,
    /// Speaking speed, defaults to normal.
    speed: Option<u8>,
}

/// Handler for POST /api/tts
///
/// Returns the synthesized MP3 stream with a one-day cache header, or the
/// JSON error envelope on failure.
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TtsRequest>,
) -> ApiResult<Response> {
    let Some(text) = request.text else {
        return Err(ApiError::InvalidInput("请提供要合成的文本".to_string()));
    };
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput("文本内容不能为空".to_string()));
    }

    if !state.speech.is_configured() {
        return Err(ApiError::Configuration(
            "语音服务未配置，请联系管理员".to_string(),
        ));
    }

    let preview: String = text.chars().take(20).collect();
    info!(text = %preview, "synthesis requested");

    let options = SynthesisOptions {
        voice: request.voice.unwrap_or(4),
        speed: request.speed.unwrap_or(5),
        ..SynthesisOptions::default()
    };
    let audio = state.speech.text_to_speech(&text, &options).await?;

    info!(bytes = audio.len(), "synthesis succeeded");

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mp3".to_string()),
            (header::CONTENT_LENGTH, audio.len().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        audio,
    )
        .into_response())
}

/// Handler for GET /api/tts/status
///
/// Reports whether speech credentials are configured; when they are, a
/// live token fetch verifies they actually work.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    if !state.speech.is_configured() {
        return Json(json!({
            "success": false,
            "message": "语音服务未配置",
            "configured": false,
        }));
    }

    match state.speech.get_access_token().await {
        Ok(_) => Json(json!({
            "success": true,
            "message": "语音服务正常",
            "configured": true,
        })),
        Err(e) => Json(json!({
            "success": false,
            "message": format!("语音服务配置错误: {}", e.user_message()),
            "configured": true,
            "error": e.user_message(),
        })),
    }
}
