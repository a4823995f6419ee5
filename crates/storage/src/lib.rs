use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{fs, path::Path, str::FromStr};
use tracing::debug;

use shared::domain::{
    AuthorRef, DocumentId, DocumentType, PitchDocument, ReferenceType, Slug, StoredStartup, UserId,
};

/// Write/read capability the pitch handler persists documents through.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Creates the document in one atomic insert and returns it with the
    /// generated `_id` and `_createdAt`.
    async fn create_document(&self, document: &PitchDocument) -> Result<StoredStartup>;

    async fn load_document(&self, id: &DocumentId) -> Result<Option<StoredStartup>>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every in-memory connection is a separate database.
        let max_connections = if database_url.starts_with("sqlite::memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_user(&self, username: &str) -> Result<UserId> {
        let rec = sqlx::query(
            "INSERT INTO users (username) VALUES (?)
             ON CONFLICT(username) DO UPDATE SET username=excluded.username
             RETURNING id",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(UserId(rec.get::<i64, _>(0)))
    }

    pub async fn username_for_user(&self, user_id: UserId) -> Result<Option<String>> {
        let row = sqlx::query("SELECT username FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    /// Most recent documents first.
    pub async fn list_documents(&self, limit: u32) -> Result<Vec<StoredStartup>> {
        let rows = sqlx::query(
            "SELECT id, title, description, category, image, slug, author_ref, pitch, created_at
             FROM startups
             ORDER BY rowid DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(startup_from_row).collect()
    }

    pub async fn count_documents_with_slug(&self, slug: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM startups WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl ContentStore for Storage {
    async fn create_document(&self, document: &PitchDocument) -> Result<StoredStartup> {
        let id = DocumentId::generate();
        let created_at = Utc::now();
        sqlx::query(
            "INSERT INTO startups (id, title, description, category, image, slug, author_ref, pitch, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(&document.title)
        .bind(&document.description)
        .bind(&document.category)
        .bind(&document.image)
        .bind(&document.slug.current)
        .bind(&document.author.target)
        .bind(&document.pitch)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("failed to insert startup document")?;
        debug!(%id, slug = %document.slug.current, "startup document inserted");

        Ok(StoredStartup {
            id,
            created_at,
            document: document.clone(),
        })
    }

    async fn load_document(&self, id: &DocumentId) -> Result<Option<StoredStartup>> {
        let row = sqlx::query(
            "SELECT id, title, description, category, image, slug, author_ref, pitch, created_at
             FROM startups WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(startup_from_row).transpose()
    }
}

fn startup_from_row(r: &SqliteRow) -> Result<StoredStartup> {
    Ok(StoredStartup {
        id: DocumentId(r.try_get::<String, _>("id")?),
        created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
        document: PitchDocument {
            kind: DocumentType::Startup,
            title: r.try_get("title")?,
            description: r.try_get("description")?,
            category: r.try_get("category")?,
            image: r.try_get("image")?,
            slug: Slug::new(r.try_get::<String, _>("slug")?),
            author: AuthorRef {
                kind: ReferenceType::Reference,
                target: r.try_get("author_ref")?,
            },
            pitch: r.try_get("pitch")?,
        },
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(parent) = sqlite_file(database_url).and_then(Path::parent) else {
        return Ok(());
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create database directory '{}'", parent.display()))
}

/// File path of a `sqlite:` URL; `None` for in-memory and non-sqlite URLs.
fn sqlite_file(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite:")?;
    if rest.starts_with(":memory:") {
        return None;
    }
    let path = rest.trim_start_matches("//").split('?').next()?;
    (!path.is_empty()).then(|| Path::new(path))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
