use std::{env, str::FromStr, time::Duration};

use crate::{
    errors::{AppError, AppResult},
    models::domain::DifficultyTier,
};

/// Largest batch the trivia API will serve in one request.
pub const MAX_BATCH_SIZE: u32 = 50;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub batch_size: u32,
    pub request_timeout_secs: u64,
    pub time_limits: TimeLimits,
}

/// Seconds allowed per question, by tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeLimits {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
    pub expert: u32,
}

impl Default for TimeLimits {
    fn default() -> Self {
        Self {
            easy: 120,
            medium: 60,
            hard: 3000,
            expert: 3000,
        }
    }
}

impl TimeLimits {
    pub fn for_tier(&self, tier: DifficultyTier) -> u32 {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Medium => self.medium,
            DifficultyTier::Hard => self.hard,
            DifficultyTier::Expert => self.expert,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = TimeLimits::default();

        Self {
            api_base_url: env::var("TRIVIA_API_URL")
                .unwrap_or_else(|_| "https://opentdb.com/api.php".to_string()),
            batch_size: env_or("TRIVIA_BATCH_SIZE", 10),
            request_timeout_secs: env_or("TRIVIA_REQUEST_TIMEOUT_SECS", 10),
            time_limits: TimeLimits {
                easy: env_or("TIME_LIMIT_EASY_SECS", defaults.easy),
                medium: env_or("TIME_LIMIT_MEDIUM_SECS", defaults.medium),
                hard: env_or("TIME_LIMIT_HARD_SECS", defaults.hard),
                expert: env_or("TIME_LIMIT_EXPERT_SECS", defaults.expert),
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rejects settings the trivia API cannot serve.
    pub fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::ValidationError(
                "TRIVIA_API_URL cannot be empty".to_string(),
            ));
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(AppError::ValidationError(format!(
                "TRIVIA_BATCH_SIZE must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9/api.php".to_string(),
            batch_size: 10,
            request_timeout_secs: 1,
            time_limits: TimeLimits::default(),
        }
    }
}
