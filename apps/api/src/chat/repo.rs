use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};

use crate::chat::session::{
    Analytics, ChatMessage, ChatSession, MessageMetadata, SessionSettings,
};
use crate::errors::AppError;
use crate::models::chat::{ChatMessageRow, ChatSessionRow};

fn message_from_row(row: ChatMessageRow) -> anyhow::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.id,
        role: row
            .role
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("chat message {}", row.id))?,
        content: row.content,
        timestamp: row.created_at,
        metadata: MessageMetadata {
            response_time: row.response_time_ms,
            tokens: row.tokens,
        },
    })
}

fn session_from_rows(
    row: ChatSessionRow,
    messages: Vec<ChatMessageRow>,
) -> anyhow::Result<ChatSession> {
    let messages = messages
        .into_iter()
        .map(message_from_row)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ChatSession {
        id: row.id,
        kind: row.kind.parse().map_err(anyhow::Error::msg)?,
        difficulty: row.difficulty.parse().map_err(anyhow::Error::msg)?,
        session_id: row.session_id,
        title: row.title,
        job_role: row.job_role,
        company: row.company,
        messages,
        settings: serde_json::from_value::<SessionSettings>(row.settings).unwrap_or_default(),
        analytics: Analytics {
            total_messages: row.total_messages,
            average_response_time: row.average_response_time,
            session_duration: row.session_duration,
        },
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Loads a session with its messages in insertion order.
pub async fn load_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Option<ChatSession>, AppError> {
    let Some(row) = sqlx::query_as::<_, ChatSessionRow>(
        "SELECT * FROM chat_sessions WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let messages = sqlx::query_as::<_, ChatMessageRow>(
        "SELECT * FROM chat_messages WHERE chat_id = $1 ORDER BY seq ASC",
    )
    .bind(row.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(session_from_rows(row, messages)?))
}

/// Persists one chat turn atomically: the session row (inserted when new,
/// analytics updated otherwise) and every message from index `first_new` on.
pub async fn save_turn(
    pool: &PgPool,
    session: &ChatSession,
    first_new: usize,
    is_new: bool,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    if is_new {
        insert_session(&mut tx, session).await?;
    } else {
        sqlx::query(
            r#"
            UPDATE chat_sessions
            SET total_messages = $2,
                average_response_time = $3,
                session_duration = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .bind(session.analytics.total_messages)
        .bind(session.analytics.average_response_time)
        .bind(session.analytics.session_duration)
        .bind(session.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for (seq, message) in session.messages.iter().enumerate().skip(first_new) {
        sqlx::query(
            r#"
            INSERT INTO chat_messages
                (id, chat_id, seq, role, content, response_time_ms, tokens, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id)
        .bind(session.id)
        .bind(seq as i32)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.metadata.response_time)
        .bind(message.metadata.tokens)
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_session(
    tx: &mut Transaction<'_, Postgres>,
    session: &ChatSession,
) -> Result<(), AppError> {
    let settings = serde_json::to_value(&session.settings).context("serialize chat settings")?;
    sqlx::query(
        r#"
        INSERT INTO chat_sessions
            (id, session_id, title, kind, job_role, company, difficulty, settings,
             total_messages, average_response_time, session_duration, is_active,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(session.id)
    .bind(&session.session_id)
    .bind(&session.title)
    .bind(session.kind.as_str())
    .bind(&session.job_role)
    .bind(&session.company)
    .bind(session.difficulty.as_str())
    .bind(settings)
    .bind(session.analytics.total_messages)
    .bind(session.analytics.average_response_time)
    .bind(session.analytics.session_duration)
    .bind(session.is_active)
    .bind(session.created_at)
    .bind(session.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Writes the editable session metadata back.
pub async fn update_metadata(pool: &PgPool, session: &ChatSession) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE chat_sessions
        SET title = $2, kind = $3, difficulty = $4, job_role = $5, updated_at = $6
        WHERE id = $1
        "#,
    )
    .bind(session.id)
    .bind(&session.title)
    .bind(session.kind.as_str())
    .bind(session.difficulty.as_str())
    .bind(&session.job_role)
    .bind(session.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Deletes a session; messages go with it via `ON DELETE CASCADE`.
pub async fn delete_session(pool: &PgPool, session_id: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM chat_sessions WHERE session_id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
