use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{api, learning, story, tts};
use crate::state::AppState;
use std::sync::Arc;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health_check))
        .route("/api/words/{character}", get(learning::get_words))
        .route("/api/sentences/{text}", get(learning::get_sentences))
        .route(
            "/api/character/explain/{character}",
            get(learning::explain_character),
        )
        .route("/api/word/explain/{word}", get(learning::explain_word))
        .route("/api/learn", post(learning::learn))
        .route("/api/story/generate", post(story::generate))
        .route("/api/tts", post(tts::synthesize))
        .route("/api/tts/status", get(tts::status))
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
