//! Access log repository: append-only `tgimglog` rows.

use sqlx::SqlitePool;
use tgrelay_common::models::AccessLogEntry;

/// Append one access log row.
pub async fn insert(pool: &SqlitePool, entry: &AccessLogEntry) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tgimglog (url, referer, ip, time) VALUES (?, ?, ?, ?)")
        .bind(&entry.url)
        .bind(&entry.referer)
        .bind(&entry.ip)
        .bind(&entry.time)
        .execute(pool)
        .await?;
    Ok(())
}

/// Number of logged accesses for `url`.
pub async fn count_for_url(pool: &SqlitePool, url: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM tgimglog WHERE url = ?")
        .bind(url)
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn rows_are_appended() {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let entry = AccessLogEntry {
            url: "/api/file/abc".into(),
            referer: "https://blog.example.net/post".into(),
            ip: "203.0.113.7".into(),
            time: "2024/1/15 10:30:05".into(),
        };
        insert(&db.pool, &entry).await.unwrap();
        insert(&db.pool, &entry).await.unwrap();

        assert_eq!(count_for_url(&db.pool, "/api/file/abc").await.unwrap(), 2);
        assert_eq!(count_for_url(&db.pool, "/api/file/other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn quotes_in_values_are_stored_verbatim() {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let entry = AccessLogEntry {
            url: "/api/file/x'); DROP TABLE tgimglog; --".into(),
            referer: "'".into(),
            ip: "\"".into(),
            time: "t".into(),
        };
        insert(&db.pool, &entry).await.unwrap();
        assert_eq!(count_for_url(&db.pool, &entry.url).await.unwrap(), 1);
    }
}
