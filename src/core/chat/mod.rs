//! Chat gateway client.
//!
//! Wraps the SiliconFlow chat-completion API into typed domain operations
//! for the literacy app: word lists, sentence lists, character and word
//! explanations, and educational stories. Every operation is one
//! synchronous request/response exchange carrying a single "user" message;
//! no conversation history, no streaming.
//!
//! Provider failures are logged with detail and surfaced uniformly as
//! [`ApiError::AiService`]. Replies that were requested as JSON but do not
//! parse degrade to a documented fallback shape instead of failing.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::ServerConfig;
use crate::errors::{ApiError, ApiResult};

mod parse;
mod prompts;

pub use parse::{MAX_LIST_ITEMS, Story, StructuredReply, WordExplanation};

/// Story protagonist gender, fixed to the two values the prompt template
/// knows pronouns for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Boy,
    Girl,
}

impl Gender {
    /// Parse the wire value ("boy" / "girl").
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "boy" => Some(Gender::Boy),
            "girl" => Some(Gender::Girl),
            _ => None,
        }
    }

    /// Wire value, echoed back in response params.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Boy => "boy",
            Gender::Girl => "girl",
        }
    }

    /// Protagonist descriptor embedded in the story prompt.
    fn descriptor(self) -> &'static str {
        match self {
            Gender::Boy => "小男孩",
            Gender::Girl => "小女孩",
        }
    }

    /// Pronoun the story is told with.
    fn pronoun(self) -> &'static str {
        match self {
            Gender::Boy => "他",
            Gender::Girl => "她",
        }
    }
}

/// Parameters for story generation.
#[derive(Debug, Clone)]
pub struct StoryParams {
    pub name: String,
    pub gender: Gender,
    pub purpose: String,
    pub scene: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// HTTP client for the chat-completion provider.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ChatClient {
    /// Create a new client from server configuration.
    ///
    /// Absence of the API key is not checked here; calls fail at request
    /// time with no pre-flight check.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.chat_base_url.clone(),
            model: config.chat_model.clone(),
            api_key: config.chat_api_key.clone(),
        }
    }

    /// One chat-completion exchange: single "user" message, no streaming.
    async fn chat(&self, prompt: String) -> ApiResult<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "chat completion request failed");
            ApiError::AiService(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "chat completion returned non-success status");
            return Err(ApiError::AiService(format!("provider returned {status}")));
        }

        let payload: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "chat completion response envelope was malformed");
            ApiError::AiService(format!("malformed response envelope: {e}"))
        })?;

        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                error!("chat completion response contained no choices");
                ApiError::AiService("response contained no choices".to_string())
            })
    }

    /// Generate up to 10 common words containing `character`.
    ///
    /// Every returned word contains `character`; under-delivery (fewer
    /// than 10, even zero) is not an error.
    pub async fn get_words(&self, character: &str) -> ApiResult<Vec<String>> {
        let content = self.chat(prompts::words(character)).await?;
        Ok(parse::filter_list_reply(&content, character))
    }

    /// Generate up to 10 short sentences containing `text`.
    pub async fn get_sentences(&self, text: &str) -> ApiResult<Vec<String>> {
        let content = self.chat(prompts::sentences(text)).await?;
        Ok(parse::filter_list_reply(&content, text))
    }

    /// Generate a 1-2 sentence child-appropriate explanation of a character.
    /// The trimmed reply is returned verbatim.
    pub async fn get_character_explanation(&self, character: &str) -> ApiResult<String> {
        let content = self.chat(prompts::character_explanation(character)).await?;
        Ok(content.trim().to_string())
    }

    /// Explain a word with usage examples.
    ///
    /// The reply is requested as JSON; a malformed reply is returned as
    /// [`StructuredReply::Fallback`] rather than failing the call.
    pub async fn get_word_explanation(&self, word: &str) -> ApiResult<StructuredReply> {
        let content = self.chat(prompts::word_explanation(word)).await?;
        let reply = parse::parse_word_explanation(&content);
        if matches!(reply, StructuredReply::Fallback(_)) {
            warn!(%word, "word explanation reply was not valid JSON, using raw text");
        }
        Ok(reply)
    }

    /// Generate an educational story for the given protagonist.
    ///
    /// Always yields non-empty `title` and `story`: a reply that is not
    /// valid JSON falls back to a templated title and the raw text.
    pub async fn generate_story(&self, params: &StoryParams) -> ApiResult<Story> {
        let content = self.chat(prompts::story(params)).await?;
        Ok(parse::parse_story(&content, &params.name))
    }
}
