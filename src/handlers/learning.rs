use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

/// Check that a path parameter is exactly one character.
fn require_single_character(character: &str) -> ApiResult<()> {
    if character.chars().count() != 1 {
        return Err(ApiError::InvalidInput("请提供单个汉字".to_string()));
    }
    Ok(())
}

/// Handler for GET /api/words/{character}
pub async fn get_words(
    State(state): State<Arc<AppState>>,
    Path(character): Path<String>,
) -> ApiResult<Json<Value>> {
    require_single_character(&character)?;

    let words = state.chat.get_words(&character).await?;
    info!(%character, count = words.len(), "word list generated");

    Ok(Json(json!({
        "success": true,
        "data": {
            "character": character,
            "words": words,
            "count": words.len(),
        }
    })))
}

/// Handler for GET /api/sentences/{text}
pub async fn get_sentences(
    State(state): State<Arc<AppState>>,
    Path(text): Path<String>,
) -> ApiResult<Json<Value>> {
    if text.is_empty() {
        return Err(ApiError::InvalidInput("请提供汉字或词语".to_string()));
    }

    let sentences = state.chat.get_sentences(&text).await?;
    info!(%text, count = sentences.len(), "sentence list generated");

    Ok(Json(json!({
        "success": true,
        "data": {
            "text": text,
            "sentences": sentences,
            "count": sentences.len(),
        }
    })))
}

/// Handler for GET /api/character/explain/{character}
pub async fn explain_character(
    State(state): State<Arc<AppState>>,
    Path(character): Path<String>,
) -> ApiResult<Json<Value>> {
    require_single_character(&character)?;

    let explanation = state.chat.get_character_explanation(&character).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "character": character,
            "explanation": explanation,
        }
    })))
}

/// Handler for GET /api/word/explain/{word}
pub async fn explain_word(
    State(state): State<Arc<AppState>>,
    Path(word): Path<String>,
) -> ApiResult<Json<Value>> {
    if word.is_empty() {
        return Err(ApiError::InvalidInput("请提供词语".to_string()));
    }

    let reply = state.chat.get_word_explanation(&word).await?;
    let (explanation, examples) = reply.into_parts();

    Ok(Json(json!({
        "success": true,
        "data": {
            "word": word,
            "explanation": explanation,
            "examples": examples,
        }
    })))
}

/// Request body for the comprehensive learning endpoint.
///
/// The field is optional so a missing key yields this API's own 400
/// envelope instead of an axum rejection.
#[derive(Debug, Deserialize)]
pub struct LearnRequest {
    character: Option<String>,
}

/// Handler for POST /api/learn
///
/// Fetches words and sentences for one character concurrently.
pub async fn learn(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LearnRequest>,
) -> ApiResult<Json<Value>> {
    let character = request.character.unwrap_or_default();
    require_single_character(&character)?;

    let (words, sentences) = tokio::try_join!(
        state.chat.get_words(&character),
        state.chat.get_sentences(&character),
    )?;
    info!(
        %character,
        words = words.len(),
        sentences = sentences.len(),
        "comprehensive learning content generated"
    );

    Ok(Json(json!({
        "success": true,
        "data": {
            "character": character,
            "words": words,
            "sentences": sentences,
        }
    })))
}
