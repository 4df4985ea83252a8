//! # tgrelay-db
//!
//! Relational store for tgrelay. A single SQLite database holds two tables:
//! - **tgimglog**: append-only access log of untrusted retrievals
//! - **imginfo**: cached safety rating and hit counter per retrieval path
//!
//! The store is optional; without it the relay neither logs nor rates.

pub mod repository;

use std::str::FromStr;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Shared database handle passed through Axum state.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Connect to the store at `url` (e.g. `sqlite://data/tgrelay.db`), creating the file if needed.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!("Connecting to SQLite...");
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        tracing::info!("Connected to SQLite");

        Ok(Self { pool })
    }

    /// Private in-memory store. One connection that never recycles, so the data survives.
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Create the tables if they don't exist yet.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Verify the store is reachable.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_migrates_and_answers() {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        assert!(db.health_check().await);
        // idempotent
        db.migrate().await.unwrap();
    }
}
