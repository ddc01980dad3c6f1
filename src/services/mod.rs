pub mod generation_service;
pub mod quiz_service;
pub mod validator;

pub use generation_service::{GenerationOutcome, GenerationRequest, GenerationService};
pub use quiz_service::QuizService;
