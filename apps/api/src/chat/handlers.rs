use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::fallback::fallback_reply;
use crate::chat::prompts::{build_chat_messages, build_system_prompt};
use crate::chat::questions::{generate_questions, InterviewQuestionSet, QuestionParams};
use crate::chat::repo;
use crate::chat::session::{
    ChatContext, ChatSession, MessageMetadata, MessageRole, SessionUpdate,
};
use crate::errors::AppError;
use crate::ids::generate_session_id;
use crate::llm_client::{CallOptions, LlmClient};
use crate::response::ApiResponse;
use crate::state::AppState;

const CHAT_OPTIONS: CallOptions = CallOptions {
    temperature: 0.7,
    max_tokens: 500,
    json_mode: false,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
    #[serde(default)]
    pub context: ChatContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResult {
    pub session_id: String,
    pub response: String,
    pub response_time: i64,
    pub message_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub role: Option<String>,
    pub level: Option<String>,
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct QuestionsPayload {
    pub questions: InterviewQuestionSet,
}

#[derive(Debug, Serialize)]
pub struct SessionPayload {
    pub session: ChatSession,
}

/// Reply text and token usage for one turn.
struct Reply {
    text: String,
    tokens: i32,
}

async fn assistant_reply(
    llm: &LlmClient,
    session: &ChatSession,
    context: &ChatContext,
    message: &str,
    fallback_enabled: bool,
) -> Result<Reply, AppError> {
    let system = build_system_prompt(
        session.effective_job_role(context),
        context.interview_type.as_deref(),
    );
    let messages = build_chat_messages(system, session.history_for_prompt(), message);

    match llm.chat(&messages, CHAT_OPTIONS).await {
        Ok(reply) => Ok(Reply {
            text: reply.text,
            tokens: reply.total_tokens as i32,
        }),
        Err(e) if fallback_enabled => {
            warn!("Chat falling back to canned reply: {e}");
            Ok(Reply {
                text: fallback_reply(message).to_string(),
                tokens: 0,
            })
        }
        Err(e) => Err(AppError::Llm(format!(
            "Chat failed and fallback is disabled: {e}"
        ))),
    }
}

/// POST /api/chat/message
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<ApiResponse<SendMessageResult>, AppError> {
    let started = Instant::now();
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".into()));
    }

    let existing = match req.session_id.as_deref().filter(|s| !s.is_empty()) {
        Some(id) => repo::load_session(&state.db, id).await?,
        None => None,
    };
    let is_new = existing.is_none();
    let mut session = existing.unwrap_or_else(|| {
        ChatSession::start(generate_session_id("chat"), message, &req.context, Utc::now())
    });
    let first_new = session.messages.len();

    session.add_message(MessageRole::User, message, MessageMetadata::default(), Utc::now());

    let reply = assistant_reply(
        &state.llm,
        &session,
        &req.context,
        message,
        state.config.llm.fallback_enabled,
    )
    .await?;

    let response_time = started.elapsed().as_millis() as i64;
    let message_id = session
        .add_message(
            MessageRole::Assistant,
            reply.text.clone(),
            MessageMetadata {
                response_time: Some(response_time),
                tokens: Some(reply.tokens),
            },
            Utc::now(),
        )
        .id;
    session.record_response_time(response_time);

    repo::save_turn(&state.db, &session, first_new, is_new).await?;

    info!(
        session_id = %session.session_id,
        response_time_ms = response_time,
        new_session = is_new,
        "Chat turn completed"
    );

    Ok(ApiResponse::ok(SendMessageResult {
        session_id: session.session_id,
        response: reply.text,
        response_time,
        message_id,
    }))
}

/// POST /api/chat/questions/generate
pub async fn generate_interview_questions(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuestionsRequest>,
) -> Result<ApiResponse<QuestionsPayload>, AppError> {
    let params = QuestionParams::resolve(req.role.as_deref(), req.level.as_deref(), req.count);
    let questions =
        generate_questions(&state.llm, &params, state.config.llm.fallback_enabled).await?;
    Ok(ApiResponse::ok(QuestionsPayload { questions }))
}

async fn require_session(state: &AppState, session_id: &str) -> Result<ChatSession, AppError> {
    repo::load_session(&state.db, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat session not found".into()))
}

/// GET /api/chat/sessions/:sessionId
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<SessionPayload>, AppError> {
    let session = require_session(&state, &session_id).await?;
    Ok(ApiResponse::ok(SessionPayload { session }))
}

/// PUT /api/chat/sessions/:sessionId
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(update): Json<SessionUpdate>,
) -> Result<ApiResponse<SessionPayload>, AppError> {
    let mut session = require_session(&state, &session_id).await?;
    session.apply_update(update, Utc::now());
    repo::update_metadata(&state.db, &session).await?;
    Ok(ApiResponse::ok(SessionPayload { session }))
}

/// DELETE /api/chat/sessions/:sessionId
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    if repo::delete_session(&state.db, &session_id).await? == 0 {
        return Err(AppError::NotFound("Chat session not found".into()));
    }
    info!(session_id = %session_id, "Chat session deleted");
    Ok(ApiResponse::message("Chat session deleted successfully"))
}
