//! Query-string parsing and SQL filter construction for job listings.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::errors::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Active: flagged active and not past its expiry date.
pub const ACTIVE_CONDITION: &str =
    "is_active AND (expiry_date IS NULL OR expiry_date > now())";

/// Raw `GET /api/jobs` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub level: Option<String>,
    pub remote: Option<String>,
    pub category: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Raw `GET /api/jobs/search` query string.
#[derive(Debug, Default, Deserialize)]
pub struct JobSearchQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    pub remote: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip)]
    pub min_salary: Option<i64>,
    #[serde(skip)]
    pub max_salary: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Salary,
    Views,
    Title,
}

impl SortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(SortField::CreatedAt),
            "salary" => Some(SortField::Salary),
            "views" => Some(SortField::Views),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Salary => "salary_max",
            SortField::Views => "views",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub descending: bool,
}

impl Sort {
    /// `ORDER BY` clause. Rows with no value sort last; `id` breaks ties so
    /// pages stay stable.
    pub fn order_by(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        format!(" ORDER BY {} {dir} NULLS LAST, id {dir}", self.field.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub filter: JobFilter,
    pub sort: Sort,
    pub pagination: Pagination,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `remote=true` selects remote jobs; any other value, empty included,
/// selects on-site ones.
fn parse_remote(value: Option<String>) -> Option<bool> {
    value.map(|v| v.trim() == "true")
}

impl JobListQuery {
    pub fn resolve(self) -> Result<ListParams, AppError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".into()));
        }
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::Validation("page is out of range".into()));
        }

        let field = match non_empty(self.sort_by) {
            Some(s) => SortField::parse(&s).ok_or_else(|| {
                AppError::Validation(format!(
                    "sortBy must be one of createdAt, salary, views, title (got {s})"
                ))
            })?,
            None => SortField::CreatedAt,
        };
        let descending = match non_empty(self.sort_order).as_deref() {
            None | Some("desc") => true,
            Some("asc") => false,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "sortOrder must be asc or desc (got {other})"
                )))
            }
        };

        Ok(ListParams {
            filter: JobFilter {
                search: non_empty(self.search),
                location: non_empty(self.location),
                kind: non_empty(self.kind),
                level: non_empty(self.level),
                remote: parse_remote(self.remote),
                category: non_empty(self.category),
                min_salary: self.min_salary,
                max_salary: self.max_salary,
            },
            sort: Sort { field, descending },
            pagination: Pagination { page, limit },
        })
    }
}

impl JobSearchQuery {
    pub fn into_filter(self) -> JobFilter {
        JobFilter {
            search: non_empty(self.q),
            location: non_empty(self.location),
            remote: parse_remote(self.remote),
            ..Default::default()
        }
    }
}

/// Escapes `%`, `_` and `\` for use inside an `ILIKE` pattern.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_salary_bound(qb: &mut QueryBuilder<'_, Postgres>, column: &str, filter: &JobFilter) {
    qb.push("(");
    qb.push(column);
    qb.push(" IS NOT NULL");
    if let Some(min) = filter.min_salary {
        qb.push(" AND ").push(column).push(" >= ").push_bind(min);
    }
    if let Some(max) = filter.max_salary {
        qb.push(" AND ").push(column).push(" <= ").push_bind(max);
    }
    qb.push(")");
}

/// Appends ` WHERE <active> AND ...` for every set filter.
pub fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    qb.push(" WHERE ").push(ACTIVE_CONDITION);

    if let Some(search) = &filter.search {
        qb.push(
            " AND to_tsvector('english', title || ' ' || description || ' ' || company) \
             @@ plainto_tsquery('english', ",
        )
        .push_bind(search.clone())
        .push(")");
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ")
            .push_bind(format!("%{}%", escape_like(location)));
    }
    if let Some(remote) = filter.remote {
        qb.push(" AND is_remote = ").push_bind(remote);
    }
    if let Some(kind) = &filter.kind {
        qb.push(" AND kind = ").push_bind(kind.clone());
    }
    if let Some(level) = &filter.level {
        qb.push(" AND level = ").push_bind(level.clone());
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if filter.min_salary.is_some() || filter.max_salary.is_some() {
        qb.push(" AND (");
        push_salary_bound(qb, "salary_min", filter);
        qb.push(" OR ");
        push_salary_bound(qb, "salary_max", filter);
        qb.push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &JobFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs");
        push_where(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_defaults() {
        let params = JobListQuery::default().resolve().unwrap();
        assert_eq!(params.pagination, Pagination { page: 1, limit: 10 });
        assert_eq!(params.sort.field, SortField::CreatedAt);
        assert!(params.sort.descending);
        assert_eq!(params.filter, JobFilter::default());
    }

    #[test]
    fn test_rejects_out_of_range_paging() {
        let q = JobListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(q.resolve(), Err(AppError::Validation(_))));
        let q = JobListQuery {
            limit: Some(101),
            ..Default::default()
        };
        assert!(matches!(q.resolve(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_unknown_sort() {
        let q = JobListQuery {
            sort_by: Some("salary; DROP TABLE jobs".into()),
            ..Default::default()
        };
        assert!(q.resolve().is_err());
        let q = JobListQuery {
            sort_order: Some("sideways".into()),
            ..Default::default()
        };
        assert!(q.resolve().is_err());
    }

    #[test]
    fn test_remote_flag_parsing() {
        assert_eq!(parse_remote(Some("true".into())), Some(true));
        assert_eq!(parse_remote(Some("no".into())), Some(false));
        assert_eq!(parse_remote(Some("".into())), Some(false));
        assert_eq!(parse_remote(None), None);
    }

    #[test]
    fn test_rejects_page_past_offset_range() {
        let q = JobListQuery {
            page: Some(i64::MAX),
            limit: Some(100),
            ..Default::default()
        };
        assert!(matches!(q.resolve(), Err(AppError::Validation(_))));

        let p = Pagination {
            page: i64::MAX,
            limit: 100,
        };
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn test_empty_remote_selects_on_site() {
        let q = JobListQuery {
            remote: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(q.resolve().unwrap().filter.remote, Some(false));
    }

    #[test]
    fn test_pagination_math() {
        let p = Pagination { page: 3, limit: 10 };
        assert_eq!(p.offset(), 20);
        assert_eq!(p.pages(0), 0);
        assert_eq!(p.pages(21), 3);
        assert_eq!(p.pages(30), 3);
    }

    #[test]
    fn test_order_by_clause() {
        let sort = Sort {
            field: SortField::Salary,
            descending: false,
        };
        assert_eq!(sort.order_by(), " ORDER BY salary_max ASC NULLS LAST, id ASC");
    }

    #[test]
    fn test_where_only_active_by_default() {
        assert_eq!(
            sql_for(&JobFilter::default()),
            format!("SELECT * FROM jobs WHERE {ACTIVE_CONDITION}")
        );
    }

    #[test]
    fn test_where_binds_every_filter() {
        let filter = JobFilter {
            search: Some("rust".into()),
            location: Some("50%_off".into()),
            kind: Some("full-time".into()),
            level: Some("senior".into()),
            remote: Some(true),
            category: Some("engineering".into()),
            min_salary: Some(80_000),
            max_salary: None,
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("plainto_tsquery('english', $1)"));
        assert!(sql.contains("location ILIKE $2"));
        assert!(sql.contains("is_remote = $3"));
        assert!(sql.contains("kind = $4"));
        assert!(sql.contains("level = $5"));
        assert!(sql.contains("category = $6"));
        assert!(sql.contains(
            "((salary_min IS NOT NULL AND salary_min >= $7) OR (salary_max IS NOT NULL AND salary_max >= $8))"
        ));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }

    #[test]
    fn test_search_query_filter() {
        let f = JobSearchQuery {
            q: Some(" react ".into()),
            location: None,
            remote: Some("true".into()),
        }
        .into_filter();
        assert_eq!(f.search.as_deref(), Some("react"));
        assert_eq!(f.remote, Some(true));
        assert_eq!(f.kind, None);
    }
}
