//! Configuration module for the renzi server
//!
//! Configuration is loaded from environment variables (with `.env` support
//! via dotenvy). Provider base URLs are part of the configuration so tests
//! can point the gateway clients at a local stub server.

mod env;

/// Server configuration
///
/// Contains everything needed to run the server:
/// - Server settings (host, port)
/// - Chat provider settings (SiliconFlow API key, base URL, model)
/// - Speech provider settings (Baidu TTS credentials and endpoints)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Chat completion provider
    pub chat_api_key: Option<String>,
    pub chat_base_url: String,
    pub chat_model: String,

    // Speech synthesis provider
    pub speech_app_id: Option<String>,
    pub speech_api_key: Option<String>,
    pub speech_secret_key: Option<String>,
    pub speech_auth_url: String,
    pub speech_tts_url: String,
}

impl ServerConfig {
    /// Socket address string for binding the listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
