use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::questions::Question;

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub question: Option<String>,
}

/// `question` stays loosely typed so a non-integer can be reported with the
/// user's progress instead of a bare extractor rejection.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub question: Value,
    #[serde(default)]
    pub answer: Value,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    #[serde(flatten)]
    pub question: Question,
    pub progress: f64,
}

#[derive(Debug, Serialize)]
pub struct CompletedResponse {
    pub stop: bool,
    pub message: &'static str,
    pub progress: f64,
}

#[derive(Debug, Serialize)]
pub struct AnswerSavedResponse {
    pub message: &'static str,
    pub next_question: i32,
    pub progress: f64,
}
