use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application error taxonomy.
///
/// Validation errors are raised at the handler boundary; provider-side
/// failures are caught inside the gateway clients and re-raised as one of
/// the generic kinds below. The variant payload carries internal detail
/// for logging; the client-facing message is derived in [`IntoResponse`]
/// and deliberately discards most provider-specific detail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Client-supplied data failed a shape/length/enum check.
    #[error("{0}")]
    InvalidInput(String),

    /// Chat provider unreachable, non-success, or unparseable with no
    /// graceful fallback.
    #[error("AI service call failed: {0}")]
    AiService(String),

    /// Speech token exchange failed.
    #[error("speech token exchange failed: {0}")]
    SpeechAuth(String),

    /// Speech synthesis call failed or returned a structured error body.
    #[error("speech synthesis failed: {message}")]
    SpeechSynthesis { code: Option<i64>, message: String },

    /// Speech credentials are absent from configuration.
    #[error("{0}")]
    Configuration(String),

    /// No route matched the request.
    #[error("route not found")]
    NotFound,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::AiService(_)
            | ApiError::SpeechAuth(_)
            | ApiError::SpeechSynthesis { .. }
            | ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// User-facing message placed in the `{success:false, message}` envelope.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::AiService(_) => "AI服务调用失败，请稍后重试".to_string(),
            ApiError::SpeechAuth(_) => "语音服务认证失败".to_string(),
            ApiError::SpeechSynthesis { code, message } => match code {
                Some(code) => format!("语音合成失败: {message} (错误码: {code})"),
                None => format!("语音合成失败: {message}"),
            },
            ApiError::Configuration(msg) => msg.clone(),
            ApiError::NotFound => "接口不存在".to_string(),
        }
    }

    /// Log the error at the appropriate level.
    pub fn log(&self) {
        match self {
            ApiError::InvalidInput(msg) => {
                tracing::warn!("Invalid input: {}", msg);
            }
            ApiError::NotFound => {
                tracing::debug!("Route not found");
            }
            ApiError::AiService(detail) => {
                tracing::error!("AI service error: {}", detail);
            }
            ApiError::SpeechAuth(detail) => {
                tracing::error!("Speech auth error: {}", detail);
            }
            ApiError::SpeechSynthesis { code, message } => {
                tracing::error!("Speech synthesis error (code {:?}): {}", code, message);
            }
            ApiError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "success": false,
            "message": self.user_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

// Result type alias for convenience
pub type ApiResult<T> = Result<T, ApiError>;
