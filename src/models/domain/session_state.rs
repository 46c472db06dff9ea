use crate::models::domain::{question::QuestionBatch, Question};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    InProgress,
    Finished,
}

/// Progress through one quiz run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub current_index: usize,
    pub score: usize,
    pub time_limit_seconds: u32,
    pub questions: QuestionBatch,
    /// Set once the current question has an outcome.
    pub resolved: bool,
}

impl SessionState {
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::InProgress => self.questions.get(self.current_index),
            _ => None,
        }
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.phase == Phase::InProgress && !self.resolved
    }
}
