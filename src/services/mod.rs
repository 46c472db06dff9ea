pub mod countdown_timer;
pub mod quiz_runner;
pub mod quiz_session;

pub use countdown_timer::{CountdownTimer, TimerEvent};
pub use quiz_runner::{QuizHandle, QuizRunner, SessionCommand};
pub use quiz_session::{LoadRequest, QuizSession, SessionSignal};
