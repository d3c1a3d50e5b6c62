use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::jobs::filters::{push_where, JobFilter, ListParams, ACTIVE_CONDITION};
use crate::jobs::stats::JobStatRow;
use crate::models::job::{JobCardRow, JobRow};

const CARD_COLUMNS: &str =
    "id, title, company, location, kind, level, salary_min, salary_max, salary_currency, salary_period, tags";
const RECOMMENDED_LIMIT: i64 = 6;
const SEARCH_LIMIT: i64 = 20;

/// One page of active jobs matching `params`, plus the total match count.
pub async fn list_jobs(
    pool: &PgPool,
    params: &ListParams,
) -> Result<(Vec<JobRow>, i64), sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs");
    push_where(&mut qb, &params.filter);
    qb.push(params.sort.order_by());
    qb.push(" LIMIT ")
        .push_bind(params.pagination.limit)
        .push(" OFFSET ")
        .push_bind(params.pagination.offset());
    let jobs = qb.build_query_as::<JobRow>().fetch_all(pool).await?;

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
    push_where(&mut count, &params.filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok((jobs, total))
}

pub async fn increment_views(pool: &PgPool, ids: &[Uuid]) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }
    sqlx::query("UPDATE jobs SET views = views + 1 WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_active(pool: &PgPool, id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    let sql = format!("SELECT * FROM jobs WHERE id = $1 AND {ACTIVE_CONDITION}");
    sqlx::query_as::<_, JobRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Active jobs whose skills or tags name one of `skills` (case-insensitive),
/// best paid first.
pub async fn find_matching_skills(
    pool: &PgPool,
    skills: &[String],
) -> Result<Vec<JobCardRow>, sqlx::Error> {
    let lowered: Vec<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let sql = format!(
        r#"
        SELECT {CARD_COLUMNS}
        FROM jobs
        WHERE {ACTIVE_CONDITION}
          AND (
            EXISTS (
                SELECT 1 FROM jsonb_array_elements(skills) s
                WHERE lower(s->>'name') = ANY($1)
            )
            OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE lower(t) = ANY($1))
          )
        ORDER BY salary_max DESC NULLS LAST, created_at DESC
        LIMIT $2
        "#
    );
    sqlx::query_as::<_, JobCardRow>(&sql)
        .bind(&lowered)
        .bind(RECOMMENDED_LIMIT)
        .fetch_all(pool)
        .await
}

pub async fn most_viewed(pool: &PgPool) -> Result<Vec<JobCardRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {CARD_COLUMNS} FROM jobs WHERE {ACTIVE_CONDITION} \
         ORDER BY views DESC, created_at DESC LIMIT $1"
    );
    sqlx::query_as::<_, JobCardRow>(&sql)
        .bind(RECOMMENDED_LIMIT)
        .fetch_all(pool)
        .await
}

pub async fn search(pool: &PgPool, filter: &JobFilter) -> Result<Vec<JobCardRow>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {CARD_COLUMNS} FROM jobs"));
    push_where(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(SEARCH_LIMIT);
    qb.build_query_as::<JobCardRow>().fetch_all(pool).await
}

pub async fn stat_rows(pool: &PgPool) -> Result<Vec<JobStatRow>, sqlx::Error> {
    let sql = format!(
        "SELECT kind, level, category, salary_min, salary_max FROM jobs WHERE {ACTIVE_CONDITION}"
    );
    sqlx::query_as::<_, JobStatRow>(&sql)
        .fetch_all(pool)
        .await
}
