use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::{is_lock_error, DatabaseError};

/// Default pool size: SQLite is single-writer, readers share the rest.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// ============================================================================
// Database
// ============================================================================

/// Handle to the content database. Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// `":memory:"` opens a private in-memory database, used by tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InstanceLocked` if another process holds the
    /// database locked, `DatabaseError::Migration` if the schema could not be
    /// created, and `DatabaseError::Other` for anything else.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        Self::open_with_options(path, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Like [`Database::open`] with an explicit pool size.
    pub async fn open_with_options(path: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout=5000: concurrent writers wait for the lock instead of
        // failing immediately with SQLITE_BUSY. Set through the connect
        // options so every pooled connection inherits it.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(DatabaseError::from_sqlx)?
            .pragma("busy_timeout", "5000");
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let db = Self { pool };
        db.migrate().await.map_err(|e| {
            if is_lock_error(&e.to_string()) {
                DatabaseError::InstanceLocked
            } else {
                DatabaseError::Migration(e.to_string())
            }
        })?;
        tracing::debug!(path = %path, max_connections, "Content database ready");
        Ok(db)
    }

    /// Close the pool, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create tables and indexes inside one transaction.
    ///
    /// Every statement uses `IF NOT EXISTS`, so running this against an
    /// existing database is a no-op.
    async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // AUTOINCREMENT: ids are never reused, even after the highest row is gone.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news_articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                summary TEXT,
                published_at INTEGER NOT NULL,
                is_featured INTEGER NOT NULL DEFAULT 0,
                category TEXT NOT NULL
                    CHECK (category IN ('news', 'announcement', 'regulation', 'service_update')),
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS gallery_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                image_url TEXT NOT NULL,
                thumbnail_url TEXT,
                category TEXT,
                taken_at INTEGER,
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        // The UNIQUE constraint on slug is what actually keeps slugs unique;
        // handler pre-checks only produce a friendlier early error.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS information_pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                page_type TEXT NOT NULL
                    CHECK (page_type IN ('service', 'regulation', 'about', 'general')),
                is_published INTEGER NOT NULL DEFAULT 1,
                meta_description TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contact_info (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                department TEXT NOT NULL,
                contact_type TEXT NOT NULL
                    CHECK (contact_type IN ('phone', 'email', 'address', 'hours')),
                label TEXT NOT NULL,
                value TEXT NOT NULL,
                is_primary INTEGER NOT NULL DEFAULT 0,
                display_order INTEGER NOT NULL DEFAULT 0 CHECK (display_order >= 0),
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        // Indexes matching each list ordering
        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_news_published ON news_articles(published_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_news_category_published ON news_articles(category, published_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_news_featured_published ON news_articles(is_featured, published_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_gallery_created ON gallery_items(created_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_pages_published_title ON information_pages(is_published, title)",
            "CREATE INDEX IF NOT EXISTS idx_contact_order ON contact_info(department, display_order, is_primary DESC)",
        ];
        for statement in indexes {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
