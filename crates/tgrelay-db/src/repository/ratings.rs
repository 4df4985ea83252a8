//! Rating repository: one `imginfo` row per retrieval path.
//!
//! Rows are created by upload bookkeeping and only ever counted afterwards;
//! retrieval never inserts.

use sqlx::SqlitePool;
use tgrelay_common::models::RatingRecord;

/// Insert a record unless one already exists for the same url.
///
/// Returns `true` when a row was written.
pub async fn insert(pool: &SqlitePool, record: &RatingRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO imginfo (url, referer, ip, rating, total, time)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.url)
    .bind(&record.referer)
    .bind(&record.ip)
    .bind(record.rating)
    .bind(record.total)
    .bind(&record.time)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Find the record for a retrieval path.
pub async fn find(pool: &SqlitePool, url: &str) -> Result<Option<RatingRecord>, sqlx::Error> {
    sqlx::query_as::<_, RatingRecord>(
        "SELECT url, referer, ip, rating, total, time FROM imginfo WHERE url = ?",
    )
    .bind(url)
    .fetch_optional(pool)
    .await
}

/// Bump the hit counter in a single statement. Returns `false` when no row matched.
pub async fn increment_total(pool: &SqlitePool, url: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE imginfo SET total = total + 1 WHERE url = ?")
        .bind(url)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
