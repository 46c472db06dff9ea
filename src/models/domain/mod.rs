pub mod difficulty;
pub mod question;
pub mod session_state;
pub use difficulty::{ApiDifficulty, DifficultyTier};
pub use question::{Question, QuestionBatch};
pub use session_state::{Phase, SessionState};
