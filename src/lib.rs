pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use errors::{ApiError, ApiResult};
pub use state::AppState;
