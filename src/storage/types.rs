use chrono::{DateTime, Utc};
use thiserror::Error;

use super::query::Table;
use crate::error::{ContentError, ContentResult};
use crate::model::{ContactInfo, GalleryItem, InformationPage, NewsArticle};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while opening the database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process holds the database locked
    #[error("The database is locked by another process. Stop it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a sqlx error, separating lock contention from everything else.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_error(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

// SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
pub(crate) fn is_lock_error(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
        || message.contains("unable to open database file")
}

// ============================================================================
// Timestamps
// ============================================================================

/// Timestamps are stored as INTEGER unix microseconds.
pub(crate) fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(entity: &'static str, column: &str, micros: i64) -> ContentResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| ContentError::InvalidRow {
        entity,
        reason: format!("{column} out of range: {micros}"),
    })
}

fn parse_column<T>(entity: &'static str, value: &str) -> ContentResult<T>
where
    T: std::str::FromStr<Err = crate::model::UnknownVariant>,
{
    T::from_str(value).map_err(|e| ContentError::InvalidRow {
        entity,
        reason: e.to_string(),
    })
}

/// Convert a batch of raw rows into model values, failing on the first corrupt row.
pub(crate) fn convert_rows<R, T>(rows: Vec<R>) -> ContentResult<Vec<T>>
where
    T: TryFrom<R, Error = ContentError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ============================================================================
// Tables
// ============================================================================

pub(crate) const NEWS_ARTICLES: Table = Table {
    name: "news_articles",
    entity: "News article",
    columns: "id, title, content, summary, published_at, is_featured, category, created_at, updated_at",
};

pub(crate) const GALLERY_ITEMS: Table = Table {
    name: "gallery_items",
    entity: "Gallery item",
    columns: "id, title, description, image_url, thumbnail_url, category, taken_at, created_at",
};

pub(crate) const INFORMATION_PAGES: Table = Table {
    name: "information_pages",
    entity: "Information page",
    columns: "id, title, slug, content, page_type, is_published, meta_description, created_at, updated_at",
};

pub(crate) const CONTACT_INFO: Table = Table {
    name: "contact_info",
    entity: "Contact info",
    columns: "id, department, contact_type, label, value, is_primary, display_order, created_at",
};

// ============================================================================
// Row Types
// ============================================================================

/// Raw `news_articles` row; converted to [`NewsArticle`] via `TryFrom`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct NewsArticleRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub published_at: i64,
    pub is_featured: bool,
    pub category: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<NewsArticleRow> for NewsArticle {
    type Error = ContentError;

    fn try_from(row: NewsArticleRow) -> ContentResult<Self> {
        let entity = NEWS_ARTICLES.entity;
        Ok(NewsArticle {
            id: row.id,
            title: row.title,
            content: row.content,
            summary: row.summary,
            published_at: from_micros(entity, "published_at", row.published_at)?,
            is_featured: row.is_featured,
            category: parse_column(entity, &row.category)?,
            created_at: from_micros(entity, "created_at", row.created_at)?,
            updated_at: from_micros(entity, "updated_at", row.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct GalleryItemRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub taken_at: Option<i64>,
    pub created_at: i64,
}

impl TryFrom<GalleryItemRow> for GalleryItem {
    type Error = ContentError;

    fn try_from(row: GalleryItemRow) -> ContentResult<Self> {
        let entity = GALLERY_ITEMS.entity;
        Ok(GalleryItem {
            id: row.id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            thumbnail_url: row.thumbnail_url,
            category: row.category,
            taken_at: row
                .taken_at
                .map(|micros| from_micros(entity, "taken_at", micros))
                .transpose()?,
            created_at: from_micros(entity, "created_at", row.created_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct InformationPageRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub page_type: String,
    pub is_published: bool,
    pub meta_description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<InformationPageRow> for InformationPage {
    type Error = ContentError;

    fn try_from(row: InformationPageRow) -> ContentResult<Self> {
        let entity = INFORMATION_PAGES.entity;
        Ok(InformationPage {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            page_type: parse_column(entity, &row.page_type)?,
            is_published: row.is_published,
            meta_description: row.meta_description,
            created_at: from_micros(entity, "created_at", row.created_at)?,
            updated_at: from_micros(entity, "updated_at", row.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ContactInfoRow {
    pub id: i64,
    pub department: String,
    pub contact_type: String,
    pub label: String,
    pub value: String,
    pub is_primary: bool,
    pub display_order: i64,
    pub created_at: i64,
}

impl TryFrom<ContactInfoRow> for ContactInfo {
    type Error = ContentError;

    fn try_from(row: ContactInfoRow) -> ContentResult<Self> {
        let entity = CONTACT_INFO.entity;
        let display_order = u32::try_from(row.display_order).map_err(|_| ContentError::InvalidRow {
            entity,
            reason: format!("display_order out of range: {}", row.display_order),
        })?;
        Ok(ContactInfo {
            id: row.id,
            department: row.department,
            contact_type: parse_column(entity, &row.contact_type)?,
            label: row.label,
            value: row.value,
            is_primary: row.is_primary,
            display_order,
            created_at: from_micros(entity, "created_at", row.created_at)?,
        })
    }
}
