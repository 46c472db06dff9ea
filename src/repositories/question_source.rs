use async_trait::async_trait;
use rand::{seq::SliceRandom, Rng};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{ApiDifficulty, DifficultyTier, Question, QuestionBatch},
        dto::{ResponseCode, TriviaApiQuestion, TriviaApiResponse},
    },
};

/// Supplies the questions for one quiz run.
///
/// Implementations never fail: any problem loading questions is logged and
/// reported as an empty batch, which callers treat as "no questions available".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_questions(&self, tier: DifficultyTier) -> QuestionBatch;
}

/// Question source backed by the Open Trivia DB HTTP API.
pub struct OpenTdbQuestionSource {
    client: reqwest::Client,
    base_url: String,
    batch_size: u32,
}

impl OpenTdbQuestionSource {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            batch_size: config.batch_size,
        })
    }

    async fn request_batch(&self, tier: DifficultyTier) -> AppResult<QuestionBatch> {
        let difficulty = tier.api_difficulty();
        log::info!(
            "Requesting {} {} questions from {}",
            self.batch_size,
            difficulty.as_query_value(),
            self.base_url
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("amount", self.batch_size.to_string()),
                ("type", "multiple".to_string()),
                ("difficulty", difficulty.as_query_value().to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        parse_batch(&body, difficulty)
    }
}

#[async_trait]
impl QuestionSource for OpenTdbQuestionSource {
    async fn fetch_questions(&self, tier: DifficultyTier) -> QuestionBatch {
        match self.request_batch(tier).await {
            Ok(batch) => {
                log::info!("Loaded {} questions for tier {}", batch.len(), tier);
                batch
            }
            Err(AppError::NetworkError(msg)) => {
                log::error!("Failed to fetch questions: {}", msg);
                QuestionBatch::empty()
            }
            Err(err) => {
                log::warn!("No questions available for tier {}: {}", tier, err);
                QuestionBatch::empty()
            }
        }
    }
}

/// Decodes an API response body into a shuffled, entity-decoded batch.
pub fn parse_batch(body: &str, requested: ApiDifficulty) -> AppResult<QuestionBatch> {
    let response: TriviaApiResponse = serde_json::from_str(body)?;

    let off_level = count_off_level(&response, requested);
    if off_level > 0 {
        log::warn!(
            "{} of {} questions were not at {} difficulty",
            off_level,
            response.results.len(),
            requested.as_query_value()
        );
    }

    let mut rng = rand::thread_rng();
    batch_from_response(response, &mut rng)
}

pub fn batch_from_response<R: Rng + ?Sized>(
    response: TriviaApiResponse,
    rng: &mut R,
) -> AppResult<QuestionBatch> {
    let code = response.code();
    if code != ResponseCode::Success {
        return Err(AppError::LoadFailure(format!("API returned {}", code)));
    }

    if response.results.is_empty() {
        return Err(AppError::LoadFailure(
            "API returned an empty result set".to_string(),
        ));
    }

    let questions = response
        .results
        .into_iter()
        .map(|item| normalize_question(item, &mut *rng))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(QuestionBatch::new(questions))
}

/// Items whose reported difficulty differs from the one requested.
fn count_off_level(response: &TriviaApiResponse, requested: ApiDifficulty) -> usize {
    response
        .results
        .iter()
        .filter_map(|item| item.difficulty.as_deref())
        .filter(|level| ApiDifficulty::from_level(level) != requested)
        .count()
}

/// Merges and shuffles the answers of one raw item, tracking the correct one by position.
pub fn normalize_question<R: Rng + ?Sized>(
    item: TriviaApiQuestion,
    rng: &mut R,
) -> AppResult<Question> {
    let mut answers: Vec<(String, bool)> = item
        .incorrect_answers
        .into_iter()
        .map(|answer| (answer, false))
        .chain(std::iter::once((item.correct_answer, true)))
        .collect();

    answers.shuffle(rng);

    let correct_index = answers
        .iter()
        .position(|(_, correct)| *correct)
        .ok_or_else(|| AppError::ValidationError("Question has no correct answer".to_string()))?;

    let answers = answers
        .into_iter()
        .map(|(text, _)| decode_entities(&text))
        .collect();

    let question = Question::new(decode_entities(&item.question), answers, correct_index)?;

    Ok(match item.category {
        Some(category) => question.with_category(decode_entities(&category)),
        None => question,
    })
}

fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
