// Chat and interview-question prompt templates.

use crate::chat::session::{ChatMessage as StoredMessage, MessageRole};
use crate::llm_client::{ChatMessage, Role};

pub const MENTOR_BASE_PROMPT: &str = "You are an AI career mentor and interview coach. \
Help users prepare for job interviews by providing constructive feedback, answering \
career-related questions, and offering professional advice. Be supportive, encouraging, \
and provide actionable suggestions.";

pub const QUESTIONS_PROMPT: &str = r#"Generate {count} interview questions for a {level} level {role} position.
Include a mix of technical, behavioral, and situational questions.
Return as JSON:
{
  "role": "{role}",
  "level": "{level}",
  "questions": [
    {
      "type": "technical|behavioral|situational",
      "question": "the question",
      "tips": ["tip1", "tip2"],
      "difficulty": "easy|medium|hard"
    }
  ]
}"#;

/// Mentor system prompt, specialised by job role or, failing that, by
/// interview type.
pub fn build_system_prompt(job_role: Option<&str>, interview_type: Option<&str>) -> String {
    fn non_empty(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|s| !s.is_empty())
    }
    if let Some(role) = non_empty(job_role) {
        return format!("{MENTOR_BASE_PROMPT} The user is preparing for a {role} position.");
    }
    if let Some(kind) = non_empty(interview_type) {
        return format!("{MENTOR_BASE_PROMPT} Focus on {kind} interview questions.");
    }
    MENTOR_BASE_PROMPT.to_string()
}

/// System prompt, prior turns, then the current user message.
pub fn build_chat_messages(
    system_prompt: String,
    history: &[StoredMessage],
    message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new(Role::System, system_prompt));
    messages.extend(history.iter().map(|m| {
        let role = match m.role {
            MessageRole::User => Role::User,
            MessageRole::Assistant | MessageRole::System => Role::Assistant,
        };
        ChatMessage::new(role, m.content.clone())
    }));
    messages.push(ChatMessage::new(Role::User, message));
    messages
}

pub fn build_questions_prompt(role: &str, level: &str, count: u32) -> String {
    QUESTIONS_PROMPT
        .replace("{count}", &count.to_string())
        .replace("{level}", level)
        .replace("{role}", role)
}
