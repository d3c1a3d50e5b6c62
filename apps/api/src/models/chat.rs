use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ChatSessionRow {
    pub id: Uuid,
    pub session_id: String,
    pub title: String,
    pub kind: String,
    pub job_role: Option<String>,
    pub company: Option<String>,
    pub difficulty: String,
    pub settings: Value,
    pub total_messages: i32,
    pub average_response_time: Option<f64>,
    pub session_duration: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageRow {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub seq: i32,
    pub role: String,
    pub content: String,
    pub response_time_ms: Option<i64>,
    pub tokens: Option<i32>,
    pub created_at: DateTime<Utc>,
}
