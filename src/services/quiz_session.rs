use tokio::sync::mpsc::UnboundedSender;

use crate::{
    config::TimeLimits,
    errors::{AppError, AppResult},
    models::domain::{DifficultyTier, Phase, Question, QuestionBatch, SessionState},
    services::countdown_timer::{CountdownTimer, TimerEvent},
};

/// Signals sent to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSignal {
    QuestionPresented {
        question: Question,
        index: usize,
        total: usize,
        time_limit: u32,
    },
    AnswerOutcome {
        correct_index: usize,
        was_correct: bool,
        chosen: Option<usize>,
    },
    TimerTick {
        remaining: u32,
    },
    SessionFinished {
        score: usize,
        total: usize,
    },
    LoadFailed,
    Rejected {
        reason: String,
    },
}

/// Identifies one call to [`QuizSession::begin`]. Only the most recent
/// request can complete a load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub tier: DifficultyTier,
}

/// The quiz state machine: Idle -> InProgress -> Finished.
pub struct QuizSession {
    state: SessionState,
    timer: CountdownTimer,
    time_limits: TimeLimits,
    signals: UnboundedSender<SessionSignal>,
    load_generation: u64,
    pending_load: Option<LoadRequest>,
}

impl QuizSession {
    pub fn new(
        time_limits: TimeLimits,
        signals: UnboundedSender<SessionSignal>,
        timer_events: UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            state: SessionState::default(),
            timer: CountdownTimer::new(timer_events),
            time_limits,
            signals,
            load_generation: 0,
            pending_load: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn pending_load(&self) -> Option<LoadRequest> {
        self.pending_load
    }

    /// Registers a new load for `tier`. The caller fetches the batch and hands
    /// it back through [`QuizSession::complete_load`].
    pub fn begin(&mut self, tier: DifficultyTier) -> AppResult<LoadRequest> {
        if self.state.phase == Phase::InProgress {
            return Err(AppError::InvalidTransition(
                "a quiz is already in progress".to_string(),
            ));
        }

        if self.state.phase == Phase::Finished {
            self.state = SessionState::default();
        }

        self.load_generation += 1;
        let request = LoadRequest {
            generation: self.load_generation,
            tier,
        };
        self.pending_load = Some(request);

        log::info!(
            "Beginning {} quiz (load request {})",
            tier,
            request.generation
        );
        Ok(request)
    }

    pub fn complete_load(&mut self, request: LoadRequest, batch: QuestionBatch) -> AppResult<()> {
        if self.pending_load != Some(request) {
            return Err(AppError::StaleResponse(format!(
                "load request {} was superseded",
                request.generation
            )));
        }
        self.pending_load = None;

        if batch.is_empty() {
            log::warn!("No questions loaded for {} quiz", request.tier);
            self.emit(SessionSignal::LoadFailed);
            return Ok(());
        }

        log::info!(
            "Starting {} quiz with {} questions",
            request.tier,
            batch.len()
        );
        self.state = SessionState {
            phase: Phase::InProgress,
            current_index: 0,
            score: 0,
            time_limit_seconds: self.time_limits.for_tier(request.tier),
            questions: batch,
            resolved: false,
        };
        self.present_current();
        Ok(())
    }

    /// Resolves the open question with the player's choice and returns whether it was correct.
    pub fn submit_answer(&mut self, choice: usize) -> AppResult<bool> {
        let question = self.open_question()?;
        let correct_index = question.correct_index();
        let answer_count = question.answers().len();
        let was_correct = question.is_correct(choice);

        if choice >= answer_count {
            return Err(AppError::ValidationError(format!(
                "Answer {} is out of range for {} answers",
                choice, answer_count
            )));
        }

        self.timer.stop();
        if was_correct {
            self.state.score += 1;
        }
        self.state.resolved = true;

        self.emit(SessionSignal::AnswerOutcome {
            correct_index,
            was_correct,
            chosen: Some(choice),
        });
        Ok(was_correct)
    }

    /// Routes an event from the countdown, dropping ones from an earlier countdown.
    pub fn handle_timer_event(&mut self, event: TimerEvent) -> AppResult<()> {
        if !self.timer.is_current(&event) {
            log::debug!("Ignoring stale timer event {:?}", event);
            return Ok(());
        }

        match event {
            TimerEvent::Tick { remaining, .. } => {
                if self.state.is_awaiting_answer() {
                    self.emit(SessionSignal::TimerTick { remaining });
                }
                Ok(())
            }
            TimerEvent::Timeout { .. } => self.on_timer_timeout(),
        }
    }

    /// Resolves the open question as unanswered.
    pub fn on_timer_timeout(&mut self) -> AppResult<()> {
        let correct_index = self.open_question()?.correct_index();

        self.timer.stop();
        self.state.resolved = true;
        log::info!("Time is up on question {}", self.state.current_index + 1);

        self.emit(SessionSignal::AnswerOutcome {
            correct_index,
            was_correct: false,
            chosen: None,
        });
        Ok(())
    }

    pub fn advance(&mut self) -> AppResult<()> {
        if self.state.phase != Phase::InProgress || !self.state.resolved {
            return Err(AppError::InvalidTransition(
                "the current question has not been resolved".to_string(),
            ));
        }

        self.state.current_index += 1;
        self.state.resolved = false;

        if self.state.current_index >= self.state.total() {
            self.timer.stop();
            self.state.phase = Phase::Finished;
            log::info!(
                "Quiz finished: {} of {}",
                self.state.score,
                self.state.total()
            );
            self.emit(SessionSignal::SessionFinished {
                score: self.state.score,
                total: self.state.total(),
            });
        } else {
            self.present_current();
        }
        Ok(())
    }

    /// Returns to Idle, dropping the batch and any load still in flight.
    pub fn reset(&mut self) {
        self.timer.stop();
        self.pending_load = None;
        self.state = SessionState::default();
        log::debug!("Session reset");
    }

    fn open_question(&self) -> AppResult<&Question> {
        if self.state.phase != Phase::InProgress {
            return Err(AppError::InvalidTransition(format!(
                "no question is open while {:?}",
                self.state.phase
            )));
        }

        if self.state.resolved {
            return Err(AppError::InvalidTransition(format!(
                "question {} is already resolved",
                self.state.current_index + 1
            )));
        }

        self.state.current_question().ok_or_else(|| {
            AppError::InvalidTransition(format!(
                "no question at index {}",
                self.state.current_index
            ))
        })
    }

    fn present_current(&mut self) {
        self.timer.start(self.state.time_limit_seconds);

        if let Some(question) = self.state.current_question().cloned() {
            self.emit(SessionSignal::QuestionPresented {
                question,
                index: self.state.current_index,
                total: self.state.total(),
                time_limit: self.state.time_limit_seconds,
            });
        }
    }

    fn emit(&self, signal: SessionSignal) {
        if self.signals.send(signal).is_err() {
            log::debug!("Signal dropped: presentation receiver is gone");
        }
    }
}
