use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::core::chat::{Gender, StoryParams};
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for story generation. All fields are required; they are
/// optional here so missing keys yield this API's own 400 envelope.
#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    name: Option<String>,
    gender: Option<String>,
    purpose: Option<String>,
    scene: Option<String>,
}

/// Handler for POST /api/story/generate
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StoryRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(name), Some(gender), Some(purpose), Some(scene)) = (
        request.name.filter(|v| !v.is_empty()),
        request.gender.filter(|v| !v.is_empty()),
        request.purpose.filter(|v| !v.is_empty()),
        request.scene.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::InvalidInput(
            "请提供完整的故事参数（name, gender, purpose, scene）".to_string(),
        ));
    };

    let Some(gender) = Gender::parse(&gender) else {
        return Err(ApiError::InvalidInput(
            "gender 参数必须是 boy 或 girl".to_string(),
        ));
    };

    info!(%name, gender = gender.as_str(), %purpose, %scene, "generating story");

    let params = StoryParams {
        name,
        gender,
        purpose,
        scene,
    };
    let story = state.chat.generate_story(&params).await?;

    info!(title = %story.title, "story generated");

    Ok(Json(json!({
        "success": true,
        "data": {
            "title": story.title,
            "story": story.story,
            "params": {
                "name": params.name,
                "gender": params.gender.as_str(),
                "purpose": params.purpose,
                "scene": params.scene,
            }
        }
    })))
}
