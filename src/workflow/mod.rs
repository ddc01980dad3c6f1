pub mod answer_ledger;
pub mod quiz_flow;
pub mod scoring;

pub use answer_ledger::{AnswerLedger, QuizSummary};
pub use quiz_flow::{QuizFlow, QuizPhase};
pub use scoring::FeedbackBand;
