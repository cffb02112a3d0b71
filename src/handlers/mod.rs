pub mod api;
pub mod learning;
pub mod story;
pub mod tts;
