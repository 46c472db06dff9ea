use std::io::BufRead;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::{
    errors::AppResult,
    models::domain::{DifficultyTier, Question},
    services::{
        quiz_runner::{QuizHandle, SessionCommand},
        quiz_session::SessionSignal,
    },
};

const INTRO_TEXT: &str = "Welcome to the trivia quiz!\nPress Enter to start (q quits at any time).";

const LOAD_FAILED_TEXT: &str =
    "Error loading questions. Please check your connection or try again.\nPress Enter to go back.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Intro,
    LevelSelect,
    Loading,
    Question,
    Outcome,
    Summary,
    LoadFailed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleAction {
    Send(SessionCommand),
    ShowLevels,
    BackToLevels,
    Hint(String),
    Quit,
}

/// Formats remaining time as `M:SS` from one minute up, `Ns` below.
pub fn format_time(seconds: u32) -> String {
    if seconds >= 60 {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

pub fn level_menu() -> String {
    let options = DifficultyTier::ALL
        .iter()
        .enumerate()
        .map(|(i, tier)| format!("  {}) {}", i + 1, tier))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Choose a level:\n{}", options)
}

fn parse_level(input: &str) -> Option<DifficultyTier> {
    match input.parse::<usize>() {
        Ok(n) if (1..=DifficultyTier::ALL.len()).contains(&n) => Some(DifficultyTier::ALL[n - 1]),
        Ok(_) => None,
        Err(_) => input.parse().ok(),
    }
}

/// Tracks which screen the player is on and translates between typed input
/// and session traffic.
pub struct ConsolePresenter {
    screen: Screen,
    current: Option<Question>,
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self {
            screen: Screen::Intro,
            current: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn interpret(&mut self, line: &str) -> ConsoleAction {
        let input = line.trim();
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            return ConsoleAction::Quit;
        }

        match self.screen {
            Screen::Intro => {
                self.screen = Screen::LevelSelect;
                ConsoleAction::ShowLevels
            }
            Screen::LevelSelect => match parse_level(input) {
                Some(tier) => {
                    self.screen = Screen::Loading;
                    ConsoleAction::Send(SessionCommand::Begin(tier))
                }
                None => ConsoleAction::Hint(level_menu()),
            },
            Screen::Loading => ConsoleAction::Hint("Loading questions...".to_string()),
            Screen::Question => {
                let count = self.current.as_ref().map_or(0, |q| q.answers().len());
                match input.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= count => ConsoleAction::Send(SessionCommand::Submit(n - 1)),
                    _ => ConsoleAction::Hint(format!(
                        "Type an answer number between 1 and {}",
                        count
                    )),
                }
            }
            Screen::Outcome => ConsoleAction::Send(SessionCommand::Advance),
            Screen::Summary | Screen::LoadFailed => {
                self.screen = Screen::LevelSelect;
                self.current = None;
                ConsoleAction::BackToLevels
            }
        }
    }

    pub fn render(&mut self, signal: &SessionSignal) -> Option<String> {
        match signal {
            SessionSignal::QuestionPresented {
                question,
                index,
                total,
                time_limit,
            } => {
                self.screen = Screen::Question;
                self.current = Some(question.clone());
                Some(render_question(question, *index, *total, *time_limit))
            }
            SessionSignal::AnswerOutcome {
                correct_index,
                was_correct,
                chosen,
            } => {
                self.screen = Screen::Outcome;
                let correct = self
                    .current
                    .as_ref()
                    .and_then(|q| q.answers().get(*correct_index))
                    .map(|text| format!("{}) {}", correct_index + 1, text))
                    .unwrap_or_else(|| (correct_index + 1).to_string());

                let verdict = match (chosen, was_correct) {
                    (None, _) => format!("Time's up! The correct answer was {}.", correct),
                    (Some(_), true) => "Correct!".to_string(),
                    (Some(_), false) => format!("Wrong. The correct answer was {}.", correct),
                };
                Some(format!("{}\nPress Enter to continue.", verdict))
            }
            SessionSignal::TimerTick { remaining } => {
                let worth_showing = *remaining % 10 == 0 || *remaining <= 5;
                (self.screen == Screen::Question && worth_showing)
                    .then(|| format!("Time left: {}", format_time(*remaining)))
            }
            SessionSignal::SessionFinished { score, total } => {
                self.screen = Screen::Summary;
                self.current = None;
                Some(format!(
                    "Game over! You scored {} out of {}!\nPress Enter to play again.",
                    score, total
                ))
            }
            SessionSignal::LoadFailed => {
                self.screen = Screen::LoadFailed;
                Some(LOAD_FAILED_TEXT.to_string())
            }
            SessionSignal::Rejected { reason } if self.screen == Screen::Loading => {
                log::warn!("Quiz could not start: {}", reason);
                self.screen = Screen::LevelSelect;
                Some(format!("Could not start the quiz.\n{}", level_menu()))
            }
            SessionSignal::Rejected { reason } => {
                log::debug!("Command rejected: {}", reason);
                None
            }
        }
    }
}

fn render_question(question: &Question, index: usize, total: usize, time_limit: u32) -> String {
    let mut text = format!("\nQuestion {} of {}", index + 1, total);
    if let Some(category) = question.category() {
        text.push_str(&format!(" [{}]", category));
    }
    text.push_str(&format!(" - {} to answer\n{}\n", format_time(time_limit), question.text()));

    for (i, answer) in question.answers().iter().enumerate() {
        text.push_str(&format!("  {}) {}\n", i + 1, answer));
    }
    text
}

/// Reads stdin on a dedicated thread, since a pending blocking read would hold
/// up runtime shutdown.
pub fn spawn_stdin_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    log::error!("Failed to read from stdin: {}", err);
                    break;
                }
            }
        }
    });

    rx
}

/// Drives the terminal until the player quits or input ends.
pub async fn run_console(
    handle: QuizHandle,
    mut signals: UnboundedReceiver<SessionSignal>,
    mut lines: UnboundedReceiver<String>,
) -> AppResult<()> {
    let mut presenter = ConsolePresenter::new();
    println!("{}", INTRO_TEXT);

    loop {
        tokio::select! {
            Some(signal) = signals.recv() => {
                if let Some(text) = presenter.render(&signal) {
                    println!("{}", text);
                }
            }
            line = lines.recv() => {
                let Some(line) = line else { break };

                match presenter.interpret(&line) {
                    ConsoleAction::Send(command) => handle.send(command)?,
                    ConsoleAction::ShowLevels => println!("{}", level_menu()),
                    ConsoleAction::BackToLevels => {
                        handle.reset_session()?;
                        println!("{}", level_menu());
                    }
                    ConsoleAction::Hint(text) => println!("{}", text),
                    ConsoleAction::Quit => break,
                }
            }
        }
    }

    log::info!("Console closed");
    Ok(())
}
