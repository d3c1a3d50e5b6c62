use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::cv::extract::format_file_size;
use crate::cv::models::{CvAnalysis, JobMatch, MissingSkill, Recommendation};

pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CvRow {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: Option<Uuid>,
    pub original_name: String,
    pub stored_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub extracted_text: String,
    pub analysis: Json<CvAnalysis>,
    pub missing_skills: Json<Vec<MissingSkill>>,
    pub recommendations: Json<Vec<Recommendation>>,
    pub job_matches: Json<Vec<JobMatch>>,
    pub analysis_source: String,
    pub status: String,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: i64,
    pub analysis_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A CV as returned to clients, with its size in human-readable form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvView {
    #[serde(flatten)]
    pub cv: CvRow,
    pub formatted_file_size: String,
}

impl From<CvRow> for CvView {
    fn from(cv: CvRow) -> Self {
        let formatted_file_size = format_file_size(cv.file_size.max(0) as u64);
        Self {
            cv,
            formatted_file_size,
        }
    }
}

/// Listing projection for a session's CV history.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CvSummaryRow {
    pub id: Uuid,
    pub original_name: String,
    pub analysis_date: DateTime<Utc>,
    pub status: String,
    pub summary: Option<String>,
}
