//! Lipsync Server - HTTP API for lip-synchronized video generation

pub mod api;
pub mod error;
pub mod settings;
pub mod state;

pub use api::create_router;
pub use error::ApiError;
pub use state::AppState;
