use std::time::{SystemTime, UNIX_EPOCH};

use axum::response::Json;
use serde_json::{Value, json};

use crate::errors::ApiError;

/// Welcome page listing the available endpoints
pub async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "🌈 学前班认字学习系统 API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "words": "/api/words/{character}",
            "sentences": "/api/sentences/{text}",
            "characterExplain": "/api/character/explain/{character}",
            "wordExplain": "/api/word/explain/{word}",
            "learn": "/api/learn",
            "storyGenerate": "/api/story/generate",
            "tts": "/api/tts",
            "ttsStatus": "/api/tts/status"
        }
    }))
}

/// Health check handler
/// Returns a simple JSON response indicating the server is running
pub async fn health_check() -> Json<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    Json(json!({
        "success": true,
        "message": "服务运行正常",
        "timestamp": timestamp
    }))
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
