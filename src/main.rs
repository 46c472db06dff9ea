use std::sync::Arc;

use trivia_quiz::{
    config::Config,
    errors::AppResult,
    handlers::{run_console, spawn_stdin_reader},
    repositories::OpenTdbQuestionSource,
    services::QuizRunner,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    config.validate()?;
    log::info!("Using trivia API at {}", config.api_base_url);

    let source = Arc::new(OpenTdbQuestionSource::new(&config)?);
    let (runner, handle, signals) = QuizRunner::new(&config, source);
    let runner_task = tokio::spawn(runner.run());

    run_console(handle, signals, spawn_stdin_reader()).await?;

    if let Err(err) = runner_task.await {
        log::error!("Quiz runner ended abnormally: {}", err);
    }
    Ok(())
}
