use std::fmt;

use serde::{Deserialize, Serialize};

/// Body returned by the Open Trivia DB `api.php` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriviaApiResponse {
    pub response_code: i64,
    #[serde(default)]
    pub results: Vec<TriviaApiQuestion>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriviaApiQuestion {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "type", default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    NoResults,
    InvalidParameter,
    TokenNotFound,
    TokenEmpty,
    RateLimit,
    Unknown(i64),
}

impl From<i64> for ResponseCode {
    fn from(code: i64) -> Self {
        match code {
            0 => ResponseCode::Success,
            1 => ResponseCode::NoResults,
            2 => ResponseCode::InvalidParameter,
            3 => ResponseCode::TokenNotFound,
            4 => ResponseCode::TokenEmpty,
            5 => ResponseCode::RateLimit,
            other => ResponseCode::Unknown(other),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Success => write!(f, "success"),
            ResponseCode::NoResults => write!(f, "not enough questions for the query"),
            ResponseCode::InvalidParameter => write!(f, "invalid parameter"),
            ResponseCode::TokenNotFound => write!(f, "session token not found"),
            ResponseCode::TokenEmpty => write!(f, "session token exhausted"),
            ResponseCode::RateLimit => write!(f, "rate limit exceeded"),
            ResponseCode::Unknown(code) => write!(f, "unknown response code {}", code),
        }
    }
}

impl TriviaApiResponse {
    pub fn code(&self) -> ResponseCode {
        ResponseCode::from(self.response_code)
    }
}
