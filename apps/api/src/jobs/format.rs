use serde::Serialize;

use crate::models::job::{JobCardRow, JobRow};

fn format_amount(amount: i64) -> String {
    if amount >= 1000 {
        format!("${}k", (amount as f64 / 1000.0).round() as i64)
    } else {
        format!("${amount}")
    }
}

/// Display form of a salary range. Zero counts as unset.
pub fn format_salary(min: Option<i64>, max: Option<i64>) -> String {
    let min = min.filter(|v| *v != 0);
    let max = max.filter(|v| *v != 0);
    match (min, max) {
        (None, None) => "Negotiable".to_string(),
        (Some(min), Some(max)) => format!("{} - {}", format_amount(min), format_amount(max)),
        (Some(min), None) => format!("From {}", format_amount(min)),
        (None, Some(max)) => format!("Up to {}", format_amount(max)),
    }
}

/// A job as returned to clients: the stored row plus derived display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView<T: Serialize> {
    #[serde(flatten)]
    pub job: T,
    pub formatted_salary: String,
}

impl From<JobRow> for JobView<JobRow> {
    fn from(job: JobRow) -> Self {
        let formatted_salary = format_salary(job.salary.min, job.salary.max);
        Self {
            job,
            formatted_salary,
        }
    }
}

impl From<JobCardRow> for JobView<JobCardRow> {
    fn from(job: JobCardRow) -> Self {
        let formatted_salary = format_salary(job.salary.min, job.salary.max);
        Self {
            job,
            formatted_salary,
        }
    }
}
