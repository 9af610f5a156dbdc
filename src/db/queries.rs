use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::judgment::Judgment;
use crate::models::listing::Listing;
use crate::models::record::ProcessedRecord;

/// Check whether a listing has already been processed in this or an
/// earlier run.
pub async fn job_exists(pool: &SqlitePool, job_url: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM jobs WHERE job_url = ?")
        .bind(job_url)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Insert a processed listing with its judgment.
///
/// Returns `Ok(true)` on success and `Ok(false)` when the unique
/// constraint on `job_url` rejects a duplicate. The duplicate case is
/// expected when a second writer races us between `job_exists` and
/// `insert_job`; any other database failure propagates.
pub async fn insert_job(
    pool: &SqlitePool,
    listing: &Listing,
    judgment: &Judgment,
) -> Result<bool, sqlx::Error> {
    let processed_date = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO jobs (job_url, title, company, raw_description, llm_score, is_agency, summary, processed_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&listing.url)
    .bind(&listing.title)
    .bind(&listing.company)
    .bind(&listing.description)
    .bind(judgment.score)
    .bind(judgment.is_agency)
    .bind(&judgment.summary)
    .bind(&processed_date)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Get a processed record by listing URL.
pub async fn get_job(
    pool: &SqlitePool,
    job_url: &str,
) -> Result<Option<ProcessedRecord>, sqlx::Error> {
    sqlx::query_as::<_, ProcessedRecord>(
        r#"
        SELECT id, job_url, title, company, raw_description, llm_score, is_agency, summary, processed_date
        FROM jobs
        WHERE job_url = ?
        "#,
    )
    .bind(job_url)
    .fetch_optional(pool)
    .await
}

/// Count all processed records.
pub async fn count_jobs(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
