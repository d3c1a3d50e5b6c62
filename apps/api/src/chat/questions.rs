use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chat::fallback::fallback_questions;
use crate::chat::prompts::build_questions_prompt;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

pub const DEFAULT_ROLE: &str = "Software Developer";
pub const DEFAULT_LEVEL: &str = "mid";
pub const DEFAULT_COUNT: u32 = 5;
pub const MAX_COUNT: u32 = 20;

const QUESTIONS_TEMPERATURE: f32 = 0.5;
const QUESTIONS_MAX_TOKENS: u32 = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub question: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestionSet {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub level: String,
    pub questions: Vec<InterviewQuestion>,
}

/// Resolved question-generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionParams {
    pub role: String,
    pub level: String,
    pub count: u32,
}

impl QuestionParams {
    /// Applies defaults for blank values and clamps `count` to `1..=MAX_COUNT`.
    pub fn resolve(role: Option<&str>, level: Option<&str>, count: Option<i64>) -> Self {
        let pick = |v: Option<&str>, default: &str| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            role: pick(role, DEFAULT_ROLE),
            level: pick(level, DEFAULT_LEVEL),
            count: count
                .map(|c| c.clamp(1, MAX_COUNT as i64) as u32)
                .unwrap_or(DEFAULT_COUNT),
        }
    }
}

pub async fn generate_questions(
    llm: &LlmClient,
    params: &QuestionParams,
    fallback_enabled: bool,
) -> Result<InterviewQuestionSet, AppError> {
    let prompt = build_questions_prompt(&params.role, &params.level, params.count);
    let result = llm
        .call_json::<InterviewQuestionSet>(
            &prompt,
            JSON_ONLY_SYSTEM,
            QUESTIONS_TEMPERATURE,
            QUESTIONS_MAX_TOKENS,
        )
        .await;

    match result {
        Ok(mut set) => {
            set.questions.truncate(params.count as usize);
            if set.role.is_empty() {
                set.role = params.role.clone();
            }
            if set.level.is_empty() {
                set.level = params.level.clone();
            }
            info!(count = set.questions.len(), "Interview questions generated by LLM");
            Ok(set)
        }
        Err(e) if fallback_enabled => {
            warn!("Question generation falling back to canned questions: {e}");
            Ok(fallback_questions(&params.role, &params.level, params.count))
        }
        Err(e) => Err(AppError::Llm(format!(
            "Question generation failed and fallback is disabled: {e}"
        ))),
    }
}
