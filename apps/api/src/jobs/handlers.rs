use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::cv::repo::find_latest_in_session;
use crate::errors::AppError;
use crate::jobs::filters::{JobFilter, JobListQuery, JobSearchQuery};
use crate::jobs::format::JobView;
use crate::jobs::repo;
use crate::jobs::stats::{compute_job_stats, JobStats};
use crate::models::job::{JobCardRow, JobRow};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PaginationInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct JobListPayload {
    pub jobs: Vec<JobView<JobRow>>,
    pub pagination: PaginationInfo,
    pub filters: JobFilter,
}

#[derive(Debug, Serialize)]
pub struct JobCardsPayload {
    pub jobs: Vec<JobView<JobCardRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct JobPayload {
    pub job: JobView<JobRow>,
}

#[derive(Debug, Serialize)]
pub struct StatsPayload {
    pub stats: JobStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedQuery {
    pub session_id: Option<String>,
}

/// GET /api/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<ApiResponse<JobListPayload>, AppError> {
    let params = query.resolve()?;
    let (mut jobs, total) = repo::list_jobs(&state.db, &params).await?;

    let ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
    repo::increment_views(&state.db, &ids).await?;
    for job in &mut jobs {
        job.views += 1;
    }

    Ok(ApiResponse::ok(JobListPayload {
        jobs: jobs.into_iter().map(JobView::from).collect(),
        pagination: PaginationInfo {
            page: params.pagination.page,
            limit: params.pagination.limit,
            total,
            pages: params.pagination.pages(total),
        },
        filters: params.filter,
    }))
}

/// GET /api/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<JobPayload>, AppError> {
    let mut job = repo::find_active(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".into()))?;

    repo::increment_views(&state.db, &[job.id]).await?;
    job.views += 1;

    Ok(ApiResponse::ok(JobPayload {
        job: JobView::from(job),
    }))
}

/// GET /api/jobs/recommended
/// Matches the skills of the session's latest CV; falls back to the most
/// viewed jobs when there is no CV or nothing matches.
pub async fn recommended_jobs(
    State(state): State<AppState>,
    Query(query): Query<RecommendedQuery>,
) -> Result<ApiResponse<JobCardsPayload>, AppError> {
    let mut jobs = Vec::new();

    if let Some(session_id) = query.session_id.as_deref().filter(|s| !s.is_empty()) {
        if let Some(cv) = find_latest_in_session(&state.db, session_id).await? {
            let skills: Vec<String> = cv.analysis.skills.iter().map(|s| s.name.clone()).collect();
            if !skills.is_empty() {
                jobs = repo::find_matching_skills(&state.db, &skills).await?;
            }
            debug!(session_id, skills = skills.len(), matched = jobs.len(), "skill-matched jobs");
        }
    }

    if jobs.is_empty() {
        jobs = repo::most_viewed(&state.db).await?;
    }

    Ok(ApiResponse::ok(JobCardsPayload {
        jobs: jobs.into_iter().map(JobView::from).collect(),
        count: None,
    }))
}

/// GET /api/jobs/stats
pub async fn job_stats(State(state): State<AppState>) -> Result<ApiResponse<StatsPayload>, AppError> {
    let rows = repo::stat_rows(&state.db).await?;
    Ok(ApiResponse::ok(StatsPayload {
        stats: compute_job_stats(&rows),
    }))
}

/// GET /api/jobs/search
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobSearchQuery>,
) -> Result<ApiResponse<JobCardsPayload>, AppError> {
    let jobs = repo::search(&state.db, &query.into_filter()).await?;
    let count = jobs.len();
    Ok(ApiResponse::ok(JobCardsPayload {
        jobs: jobs.into_iter().map(JobView::from).collect(),
        count: Some(count),
    }))
}
