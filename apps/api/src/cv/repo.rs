use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cv::models::EnrichedAnalysis;
use crate::models::cv::{CvRow, CvSummaryRow, STATUS_COMPLETED};

/// Parameters for persisting an analyzed CV.
pub struct NewCv<'a> {
    pub session_id: &'a str,
    pub user_id: Option<Uuid>,
    pub original_name: &'a str,
    pub stored_name: &'a str,
    pub file_path: &'a str,
    pub file_size: i64,
    pub file_type: &'a str,
    pub extracted_text: &'a str,
    pub enriched: &'a EnrichedAnalysis,
    pub analysis_source: &'a str,
    pub processing_time_ms: i64,
}

pub async fn insert_cv(pool: &PgPool, cv: NewCv<'_>) -> Result<CvRow, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        r#"
        INSERT INTO cvs
            (session_id, user_id, original_name, stored_name, file_path, file_size,
             file_type, extracted_text, analysis, missing_skills, recommendations,
             job_matches, analysis_source, status, processing_time_ms)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(cv.session_id)
    .bind(cv.user_id)
    .bind(cv.original_name)
    .bind(cv.stored_name)
    .bind(cv.file_path)
    .bind(cv.file_size)
    .bind(cv.file_type)
    .bind(cv.extracted_text)
    .bind(Json(&cv.enriched.analysis))
    .bind(Json(&cv.enriched.missing_skills))
    .bind(Json(&cv.enriched.recommendations))
    .bind(Json(&cv.enriched.job_matches))
    .bind(cv.analysis_source)
    .bind(STATUS_COMPLETED)
    .bind(cv.processing_time_ms)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>("SELECT * FROM cvs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Most recent CV analyzed under a session.
pub async fn find_latest_in_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        "SELECT * FROM cvs WHERE session_id = $1 ORDER BY analysis_date DESC LIMIT 1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_session_summaries(
    pool: &PgPool,
    session_id: &str,
) -> Result<Vec<CvSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, CvSummaryRow>(
        r#"
        SELECT id, original_name, analysis_date, status, analysis->>'summary' AS summary
        FROM cvs
        WHERE session_id = $1
        ORDER BY analysis_date DESC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}

pub async fn find_in_session(
    pool: &PgPool,
    session_id: &str,
    cv_id: Uuid,
) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>("SELECT * FROM cvs WHERE id = $1 AND session_id = $2")
        .bind(cv_id)
        .bind(session_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_cv(pool: &PgPool, cv_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cvs WHERE id = $1")
        .bind(cv_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
