use crate::errors::{AppError, AppResult};

/// A normalized multiple-choice question with exactly one correct answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    text: String,
    answers: Vec<String>,
    correct_index: usize,
    category: Option<String>,
}

impl Question {
    pub fn new(text: String, answers: Vec<String>, correct_index: usize) -> AppResult<Self> {
        if answers.len() < 2 {
            return Err(AppError::ValidationError(format!(
                "Question '{}' needs at least two answers, got {}",
                text,
                answers.len()
            )));
        }

        if correct_index >= answers.len() {
            return Err(AppError::ValidationError(format!(
                "Correct index {} is out of range for {} answers",
                correct_index,
                answers.len()
            )));
        }

        Ok(Self {
            text,
            answers,
            correct_index,
            category: None,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_answer(&self) -> &str {
        &self.answers[self.correct_index]
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }
}

/// The questions fetched for one quiz run. Read-only once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionBatch {
    questions: Vec<Question>,
}

impl QuestionBatch {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}
