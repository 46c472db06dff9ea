pub mod trivia_api;
pub use trivia_api::{ResponseCode, TriviaApiQuestion, TriviaApiResponse};
