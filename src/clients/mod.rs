pub mod ai_client;
pub mod content_client;

pub use ai_client::{AiClient, CompletionGateway};
pub use content_client::{ContentProvider, HttpContentClient};
