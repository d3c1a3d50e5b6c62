//! Chat session state machine.
//!
//! A `ChatSession` is loaded from storage, mutated in memory for one turn
//! (user message, assistant reply, analytics) and written back by
//! `chat::repo`. Nothing here touches the database or the LLM.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "New Interview Practice";
pub const TITLE_MAX_CHARS: usize = 50;
/// Prior messages forwarded to the model with each turn.
pub const HISTORY_WINDOW: usize = 10;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("invalid {}: {other}", stringify!($name))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
    System => "system",
});

string_enum!(InterviewType {
    Technical => "technical",
    Behavioral => "behavioral",
    Mixed => "mixed",
    Custom => "custom",
});

string_enum!(Difficulty {
    Junior => "junior",
    Mid => "mid",
    Senior => "senior",
    Executive => "executive",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    #[serde(default = "default_max_response_time")]
    pub max_response_time: i64,
    #[serde(default = "default_true")]
    pub enable_feedback: bool,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_max_response_time() -> i64 {
    300_000
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_response_time: default_max_response_time(),
            enable_feedback: true,
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: MessageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_messages: i32,
    pub average_response_time: Option<f64>,
    pub session_duration: Option<i64>,
}

/// Optional interview context sent with a chat message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    #[serde(rename = "type")]
    pub kind: Option<InterviewType>,
    pub job_role: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub interview_type: Option<String>,
}

/// Partial update of session metadata. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<InterviewType>,
    pub difficulty: Option<Difficulty>,
    pub job_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub session_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: InterviewType,
    pub job_role: Option<String>,
    pub company: Option<String>,
    pub difficulty: Difficulty,
    pub messages: Vec<ChatMessage>,
    pub settings: SessionSettings,
    pub analytics: Analytics,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// First `TITLE_MAX_CHARS` characters of the opening message, with `...`
/// appended when it was cut.
pub fn derive_title(first_message: &str) -> String {
    let mut chars = first_message.char_indices();
    match chars.nth(TITLE_MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &first_message[..idx]),
        None if first_message.is_empty() => DEFAULT_TITLE.to_string(),
        None => first_message.to_string(),
    }
}

impl ChatSession {
    /// Opens a new session for `first_message`, taking type, role and
    /// difficulty from the request context.
    pub fn start(
        session_id: String,
        first_message: &str,
        context: &ChatContext,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            title: derive_title(first_message),
            kind: context.kind.unwrap_or(InterviewType::Mixed),
            job_role: context
                .job_role
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            company: None,
            difficulty: context.difficulty.unwrap_or(Difficulty::Mid),
            messages: Vec::new(),
            settings: SessionSettings::default(),
            analytics: Analytics::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_message(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        metadata: MessageMetadata,
        now: DateTime<Utc>,
    ) -> &ChatMessage {
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: now,
            metadata,
        });
        self.analytics.total_messages = self.messages.len() as i32;
        self.analytics.session_duration = Some(self.duration_ms());
        self.updated_at = now;
        &self.messages[self.messages.len() - 1]
    }

    /// Folds `ms` into the running mean over timed assistant replies.
    /// Call after appending the reply it measures.
    pub fn record_response_time(&mut self, ms: i64) {
        let timed = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant && m.metadata.response_time.is_some())
            .count()
            .max(1) as f64;
        let previous = self.analytics.average_response_time.unwrap_or(0.0);
        self.analytics.average_response_time = Some(previous + (ms as f64 - previous) / timed);
    }

    /// Milliseconds between session creation and the latest message.
    pub fn duration_ms(&self) -> i64 {
        self.messages
            .last()
            .map(|m| (m.timestamp - self.created_at).num_milliseconds().max(0))
            .unwrap_or(0)
    }

    /// Messages before the current (last) user message, newest
    /// `HISTORY_WINDOW` only.
    pub fn history_for_prompt(&self) -> &[ChatMessage] {
        let prior = match self.messages.last() {
            Some(last) if last.role == MessageRole::User => &self.messages[..self.messages.len() - 1],
            _ => &self.messages[..],
        };
        let start = prior.len().saturating_sub(HISTORY_WINDOW);
        &prior[start..]
    }

    /// Job role for prompting: the request context wins over the session.
    pub fn effective_job_role<'a>(&'a self, context: &'a ChatContext) -> Option<&'a str> {
        context
            .job_role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or(self.job_role.as_deref())
    }

    pub fn apply_update(&mut self, update: SessionUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(difficulty) = update.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(job_role) = update.job_role.filter(|r| !r.trim().is_empty()) {
            self.job_role = Some(job_role);
        }
        self.updated_at = now;
    }
}
