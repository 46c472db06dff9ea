use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{DifficultyTier, QuestionBatch},
    repositories::QuestionSource,
    services::{
        countdown_timer::TimerEvent,
        quiz_session::{LoadRequest, QuizSession, SessionSignal},
    },
};

/// Commands accepted from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Begin(DifficultyTier),
    Submit(usize),
    Advance,
    Reset,
}

struct LoadCompletion {
    request: LoadRequest,
    batch: QuestionBatch,
}

/// Cloneable sender side of a running [`QuizRunner`].
#[derive(Clone, Debug)]
pub struct QuizHandle {
    commands: UnboundedSender<SessionCommand>,
}

impl QuizHandle {
    pub fn begin_session(&self, tier: DifficultyTier) -> AppResult<()> {
        self.send(SessionCommand::Begin(tier))
    }

    pub fn submit_answer(&self, index: usize) -> AppResult<()> {
        self.send(SessionCommand::Submit(index))
    }

    pub fn advance_to_next(&self) -> AppResult<()> {
        self.send(SessionCommand::Advance)
    }

    pub fn reset_session(&self) -> AppResult<()> {
        self.send(SessionCommand::Reset)
    }

    pub fn send(&self, command: SessionCommand) -> AppResult<()> {
        self.commands
            .send(command)
            .map_err(|_| AppError::ChannelClosed(format!("quiz runner stopped before {:?}", command)))
    }
}

/// Event loop that owns one [`QuizSession`] and feeds it commands, timer
/// events and load completions one at a time.
pub struct QuizRunner {
    session: QuizSession,
    source: Arc<dyn QuestionSource>,
    signals: UnboundedSender<SessionSignal>,
    commands: UnboundedReceiver<SessionCommand>,
    timer_events: UnboundedReceiver<TimerEvent>,
    loads_tx: UnboundedSender<LoadCompletion>,
    loads_rx: UnboundedReceiver<LoadCompletion>,
}

impl QuizRunner {
    pub fn new(
        config: &Config,
        source: Arc<dyn QuestionSource>,
    ) -> (Self, QuizHandle, UnboundedReceiver<SessionSignal>) {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();

        let runner = Self {
            session: QuizSession::new(config.time_limits, signal_tx.clone(), timer_tx),
            source,
            signals: signal_tx,
            commands: command_rx,
            timer_events: timer_rx,
            loads_tx,
            loads_rx,
        };

        (
            runner,
            QuizHandle {
                commands: command_tx,
            },
            signal_rx,
        )
    }

    /// Runs until every [`QuizHandle`] has been dropped.
    pub async fn run(mut self) {
        log::info!("Quiz runner started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.timer_events.recv() => {
                    if let Err(err) = self.session.handle_timer_event(event) {
                        log::debug!("Timer event not applied: {}", err);
                    }
                }
                Some(completion) = self.loads_rx.recv() => {
                    self.handle_load(completion);
                }
            }
        }

        self.session.reset();
        log::info!("Quiz runner stopped");
    }

    fn handle_command(&mut self, command: SessionCommand) {
        log::debug!("Handling {:?}", command);

        let result = match command {
            SessionCommand::Begin(tier) => self.session.begin(tier).map(|request| {
                self.spawn_load(request);
            }),
            SessionCommand::Submit(index) => self.session.submit_answer(index).map(|_| ()),
            SessionCommand::Advance => self.session.advance(),
            SessionCommand::Reset => {
                self.session.reset();
                Ok(())
            }
        };

        if let Err(err) = result {
            log::warn!("Rejected {:?}: {}", command, err);
            let _ = self.signals.send(SessionSignal::Rejected {
                reason: err.to_string(),
            });
        }
    }

    fn spawn_load(&self, request: LoadRequest) {
        let source = Arc::clone(&self.source);
        let loads = self.loads_tx.clone();

        tokio::spawn(async move {
            let batch = source.fetch_questions(request.tier).await;
            let _ = loads.send(LoadCompletion { request, batch });
        });
    }

    fn handle_load(&mut self, completion: LoadCompletion) {
        match self.session.complete_load(completion.request, completion.batch) {
            Ok(()) => {}
            Err(AppError::StaleResponse(msg)) => {
                log::debug!("Discarding stale question batch: {}", msg);
            }
            Err(err) => {
                log::warn!("Question batch not applied: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repositories::question_source::MockQuestionSource, test_utils::fixtures::sample_batch,
    };
    use tokio::time::{self, Duration};

    fn spawn_runner(
        source: MockQuestionSource,
    ) -> (QuizHandle, UnboundedReceiver<SessionSignal>) {
        let (runner, handle, signals) = QuizRunner::new(&Config::test_config(), Arc::new(source));
        tokio::spawn(runner.run());
        (handle, signals)
    }

    #[tokio::test(start_paused = true)]
    async fn begin_fetches_once_and_presents_first_question() {
        let mut source = MockQuestionSource::new();
        source
            .expect_fetch_questions()
            .withf(|tier| *tier == DifficultyTier::Expert)
            .times(1)
            .returning(|_| sample_batch(10));

        let (handle, mut signals) = spawn_runner(source);
        handle
            .begin_session(DifficultyTier::Expert)
            .expect("runner is alive");

        let signal = signals.recv().await.expect("question signal");
        assert!(matches!(
            signal,
            SessionSignal::QuestionPresented {
                index: 0,
                total: 10,
                time_limit: 3000,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_batch_signals_load_failed() {
        let mut source = MockQuestionSource::new();
        source
            .expect_fetch_questions()
            .times(1)
            .returning(|_| QuestionBatch::empty());

        let (handle, mut signals) = spawn_runner(source);
        handle
            .begin_session(DifficultyTier::Medium)
            .expect("runner is alive");

        assert_eq!(signals.recv().await, Some(SessionSignal::LoadFailed));

        time::sleep(Duration::from_secs(5)).await;
        assert!(signals.try_recv().is_err(), "no timer ticks after a failed load");
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_commands_are_signalled_as_rejected() {
        let source = MockQuestionSource::new();
        let (handle, mut signals) = spawn_runner(source);

        handle.submit_answer(0).expect("runner is alive");

        assert!(matches!(
            signals.recv().await,
            Some(SessionSignal::Rejected { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_reach_the_presentation() {
        let mut source = MockQuestionSource::new();
        source
            .expect_fetch_questions()
            .returning(|_| sample_batch(3));

        let (handle, mut signals) = spawn_runner(source);
        handle.begin_session(DifficultyTier::Easy).expect("runner is alive");

        signals.recv().await.expect("question signal");
        assert_eq!(
            signals.recv().await,
            Some(SessionSignal::TimerTick { remaining: 119 })
        );
    }

    struct SlowSource {
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl QuestionSource for SlowSource {
        async fn fetch_questions(&self, _tier: DifficultyTier) -> QuestionBatch {
            time::sleep(self.delay).await;
            sample_batch(10)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batch_arriving_after_reset_is_discarded() {
        let source = Arc::new(SlowSource {
            delay: Duration::from_secs(5),
        });
        let (runner, handle, mut signals) = QuizRunner::new(&Config::test_config(), source);
        tokio::spawn(runner.run());

        handle.begin_session(DifficultyTier::Easy).expect("runner is alive");
        handle.reset_session().expect("runner is alive");

        time::sleep(Duration::from_secs(10)).await;
        assert!(signals.try_recv().is_err(), "stale batch must not start a quiz");

        handle.begin_session(DifficultyTier::Hard).expect("runner is alive");
        let signal = signals.recv().await.expect("question signal");
        assert!(matches!(
            signal,
            SessionSignal::QuestionPresented {
                time_limit: 3000,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn handle_reports_stopped_runner() {
        let source = MockQuestionSource::new();
        let (runner, handle, _signals) = QuizRunner::new(&Config::test_config(), Arc::new(source));
        drop(runner);

        assert!(matches!(
            handle.advance_to_next(),
            Err(AppError::ChannelClosed(_))
        ));
    }
}
