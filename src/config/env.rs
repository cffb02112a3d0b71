use std::env;

use super::ServerConfig;

/// Default SiliconFlow chat-completion endpoint base.
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.siliconflow.cn/v1";
/// Default chat-completion model.
pub const DEFAULT_CHAT_MODEL: &str = "Qwen/Qwen2.5-72B-Instruct";
/// Default Baidu OAuth2 client-credentials token endpoint.
pub const DEFAULT_SPEECH_AUTH_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";
/// Default Baidu speech synthesis endpoint.
pub const DEFAULT_SPEECH_TTS_URL: &str = "https://tsn.baidu.com/text2audio";

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible
    /// defaults. Also loads from a .env file if present using dotenvy.
    ///
    /// # Errors
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // Server configuration
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid port number: {e}"))?;

        // Chat completion provider
        let chat_api_key = env::var("SILICONFLOW_API_KEY").ok();
        let chat_base_url =
            env::var("SILICONFLOW_BASE_URL").unwrap_or_else(|_| DEFAULT_CHAT_BASE_URL.to_string());
        let chat_model =
            env::var("SILICONFLOW_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());

        // Speech synthesis provider
        let speech_app_id = env::var("BAIDU_TTS_APP_ID").ok();
        let speech_api_key = env::var("BAIDU_TTS_API_KEY").ok();
        let speech_secret_key = env::var("BAIDU_TTS_SECRET_KEY").ok();
        let speech_auth_url =
            env::var("BAIDU_TTS_AUTH_URL").unwrap_or_else(|_| DEFAULT_SPEECH_AUTH_URL.to_string());
        let speech_tts_url =
            env::var("BAIDU_TTS_URL").unwrap_or_else(|_| DEFAULT_SPEECH_TTS_URL.to_string());

        Ok(ServerConfig {
            host,
            port,
            chat_api_key,
            chat_base_url,
            chat_model,
            speech_app_id,
            speech_api_key,
            speech_secret_key,
            speech_auth_url,
            speech_tts_url,
        })
    }
}
