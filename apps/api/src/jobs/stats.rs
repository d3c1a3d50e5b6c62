use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::FromRow;

/// Columns of an active job that feed the statistics.
#[derive(Debug, Clone, FromRow)]
pub struct JobStatRow {
    pub kind: String,
    pub level: String,
    pub category: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total_jobs: usize,
    pub avg_salary: i64,
    pub type_distribution: BTreeMap<String, usize>,
    pub level_distribution: BTreeMap<String, usize>,
    pub category_distribution: BTreeMap<String, usize>,
}

pub fn distribution<'a>(values: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(v.to_string()).or_insert(0) += 1;
    }
    counts
}

fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, n) = values.fold((0i128, 0u32), |(s, n), v| (s + v as i128, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

/// Totals and distributions over active jobs. `avg_salary` is the rounded
/// midpoint of the mean minimum and mean maximum; a side with no data is
/// left out of the midpoint.
pub fn compute_job_stats(rows: &[JobStatRow]) -> JobStats {
    let avg_min = mean(rows.iter().filter_map(|r| r.salary_min));
    let avg_max = mean(rows.iter().filter_map(|r| r.salary_max));
    let avg_salary = match (avg_min, avg_max) {
        (Some(lo), Some(hi)) => ((lo + hi) / 2.0).round() as i64,
        (Some(only), None) | (None, Some(only)) => only.round() as i64,
        (None, None) => 0,
    };

    JobStats {
        total_jobs: rows.len(),
        avg_salary,
        type_distribution: distribution(rows.iter().map(|r| r.kind.as_str())),
        level_distribution: distribution(rows.iter().map(|r| r.level.as_str())),
        category_distribution: distribution(rows.iter().map(|r| r.category.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str, level: &str, min: Option<i64>, max: Option<i64>) -> JobStatRow {
        JobStatRow {
            kind: kind.into(),
            level: level.into(),
            category: "engineering".into(),
            salary_min: min,
            salary_max: max,
        }
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(compute_job_stats(&[]), JobStats::default());
    }

    #[test]
    fn test_stats_over_rows() {
        let rows = vec![
            row("full-time", "senior", Some(120_000), Some(160_000)),
            row("full-time", "mid", Some(80_000), Some(110_000)),
            row("contract", "mid", None, None),
        ];
        let stats = compute_job_stats(&rows);
        assert_eq!(stats.total_jobs, 3);
        // avg min 100k, avg max 135k
        assert_eq!(stats.avg_salary, 117_500);
        assert_eq!(stats.type_distribution["full-time"], 2);
        assert_eq!(stats.type_distribution["contract"], 1);
        assert_eq!(stats.level_distribution["mid"], 2);
        assert_eq!(stats.category_distribution["engineering"], 3);
    }

    #[test]
    fn test_one_sided_salaries() {
        let rows = vec![row("internship", "intern", None, Some(30_001))];
        assert_eq!(compute_job_stats(&rows).avg_salary, 30_001);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(compute_job_stats(&[])).unwrap();
        assert!(json.get("totalJobs").is_some());
        assert!(json.get("typeDistribution").is_some());
    }
}
