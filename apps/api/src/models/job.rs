use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSkill {
    pub name: String,
    #[serde(default = "default_importance")]
    pub importance: String,
}

fn default_importance() -> String {
    "required".to_string()
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Salary {
    #[sqlx(rename = "salary_min")]
    pub min: Option<i64>,
    #[sqlx(rename = "salary_max")]
    pub max: Option<i64>,
    #[sqlx(rename = "salary_currency")]
    pub currency: String,
    #[sqlx(rename = "salary_period")]
    pub period: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub company_logo: Option<String>,
    pub location: String,
    pub is_remote: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
    #[sqlx(flatten)]
    pub salary: Salary,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub benefits: Vec<String>,
    pub skills: Json<Vec<JobSkill>>,
    pub category: String,
    pub tags: Vec<String>,
    pub application_url: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub posted_by: Option<Uuid>,
    pub views: i64,
    pub applications: i64,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Card projection used by search and recommendations.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobCardRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
    #[sqlx(flatten)]
    pub salary: Salary,
    pub tags: Vec<String>,
}
