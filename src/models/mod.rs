pub mod material;
pub mod payload;
pub mod quiz;

pub use material::MaterialInfo;
pub use payload::{RawOption, RawQuestion, RawQuizPayload};
pub use quiz::{
    AnswerOutcome, NewOption, NewQuestion, OptionLetter, PlayerOption, PlayerQuestion, QuizAnswer,
    QuizOption, QuizQuestion, StoredQuestion,
};
