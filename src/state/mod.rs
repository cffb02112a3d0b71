use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::chat::ChatClient;
use crate::core::speech::SpeechClient;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: ServerConfig,
    pub chat: ChatClient,
    pub speech: SpeechClient,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let chat = ChatClient::from_config(&config);
        let speech = SpeechClient::from_config(&config);
        Arc::new(Self {
            config,
            chat,
            speech,
        })
    }
}
