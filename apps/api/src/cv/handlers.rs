use std::time::Instant;

use axum::extract::{Multipart, Path, State};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::extractors::MaybeAuthUser;
use crate::cv::analyzer::analyze_cv;
use crate::cv::enrichment::enrich;
use crate::cv::extract::{
    extension_for, extract_text, resolve_file_type, validate_file_size,
    validate_file_type, ExtractError,
};
use crate::cv::models::EnrichedAnalysis;
use crate::cv::repo::{self, NewCv};
use crate::errors::AppError;
use crate::ids::{generate_session_id, is_valid_public_id};
use crate::models::cv::{CvSummaryRow, CvView};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::storage::cv_object_key;

const FILE_FIELD: &str = "cv";

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    session_id: Option<String>,
    target_role: Option<String>,
}

struct UploadedFile {
    original_name: String,
    content_type: Option<String>,
    data: Bytes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub session_id: String,
    pub cv_id: Uuid,
    pub analysis: EnrichedAnalysis,
    pub processing_time: i64,
    pub analysis_source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CvPayload {
    pub cv: CvView,
}

#[derive(Debug, Serialize)]
pub struct CvListPayload {
    pub cvs: Vec<CvSummaryRow>,
    pub count: usize,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let original_name = field.file_name().unwrap_or("cv").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                form.file = Some(UploadedFile {
                    original_name,
                    content_type,
                    data,
                });
            }
            "sessionId" => form.session_id = non_blank(field.text().await?),
            "targetRole" => form.target_role = non_blank(field.text().await?),
            _ => {}
        }
    }
    Ok(form)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// POST /api/cv/upload
pub async fn upload_cv(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<UploadResult>, AppError> {
    let started = Instant::now();
    let form = read_upload_form(multipart).await?;
    if let Some(id) = form.session_id.as_deref() {
        if !is_valid_public_id(id) {
            return Err(AppError::Validation(
                "Invalid sessionId: use letters, digits, '_' or '-' (max 64)".into(),
            ));
        }
    }

    let file = form
        .file
        .ok_or_else(|| AppError::Validation("No file uploaded".into()))?;
    let file_type = resolve_file_type(file.content_type.as_deref(), &file.original_name);
    validate_file_type(&file_type)?;
    validate_file_size(file.data.len(), state.config.max_upload_bytes)?;

    let data = file.data.clone();
    let ft = file_type.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&data, &ft))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::from(ExtractError::Pdf(format!("extraction task panicked: {e}")))
            } else {
                AppError::Internal(anyhow::anyhow!("extraction task failed: {e}"))
            }
        })??;
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from the uploaded file".into(),
        ));
    }

    let session_id = form
        .session_id
        .unwrap_or_else(|| generate_session_id("sess"));

    let outcome = analyze_cv(
        &state.llm,
        &text,
        form.target_role.as_deref(),
        state.config.llm.fallback_enabled,
    )
    .await?;
    let enriched = enrich(outcome.analysis);

    let stored_name = format!("{}.{}", Uuid::new_v4(), extension_for(&file_type));
    let key = cv_object_key(&session_id, &stored_name);
    state.files.put(&key, file.data.clone(), &file_type).await?;

    let processing_time_ms = started.elapsed().as_millis() as i64;
    let inserted = repo::insert_cv(
        &state.db,
        NewCv {
            session_id: &session_id,
            user_id,
            original_name: &file.original_name,
            stored_name: &stored_name,
            file_path: &key,
            file_size: file.data.len() as i64,
            file_type: &file_type,
            extracted_text: &text,
            enriched: &enriched,
            analysis_source: outcome.source.as_str(),
            processing_time_ms,
        },
    )
    .await;

    let row = match inserted {
        Ok(row) => row,
        Err(e) => {
            error!("Failed to persist CV, removing stored file: {e}");
            state.files.remove(&key).await;
            return Err(e.into());
        }
    };

    info!(
        cv_id = %row.id,
        session_id = %session_id,
        source = outcome.source.as_str(),
        processing_time_ms,
        "CV analyzed"
    );

    Ok(ApiResponse::ok(UploadResult {
        session_id,
        cv_id: row.id,
        analysis: enriched,
        processing_time: processing_time_ms,
        analysis_source: outcome.source.as_str(),
    })
    .with_message("CV uploaded and analyzed successfully"))
}

/// GET /api/cv/:id
pub async fn get_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<CvPayload>, AppError> {
    let cv = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("CV not found".into()))?;
    Ok(ApiResponse::ok(CvPayload { cv: cv.into() }))
}

/// GET /api/cv/session/:sessionId
pub async fn get_session_cv(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<CvPayload>, AppError> {
    let cv = repo::find_latest_in_session(&state.db, &session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No CV found for this session".into()))?;
    Ok(ApiResponse::ok(CvPayload { cv: cv.into() }))
}

/// GET /api/cv/session/:sessionId/cvs
pub async fn list_session_cvs(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<CvListPayload>, AppError> {
    let cvs = repo::list_session_summaries(&state.db, &session_id).await?;
    let count = cvs.len();
    Ok(ApiResponse::ok(CvListPayload { cvs, count }))
}

/// DELETE /api/cv/session/:sessionId/cv/:cvId
pub async fn delete_session_cv(
    State(state): State<AppState>,
    Path((session_id, cv_id)): Path<(String, Uuid)>,
) -> Result<ApiResponse<()>, AppError> {
    let cv = repo::find_in_session(&state.db, &session_id, cv_id)
        .await?
        .ok_or_else(|| AppError::NotFound("CV not found".into()))?;

    repo::delete_cv(&state.db, cv.id).await?;
    state.files.remove(&cv.file_path).await;

    info!(cv_id = %cv.id, session_id = %session_id, "CV deleted");
    Ok(ApiResponse::message("CV deleted successfully"))
}
