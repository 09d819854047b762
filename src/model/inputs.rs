//! Request payloads accepted by the content handlers.
//!
//! Defaults that the browser client may omit (`is_featured`, `is_published`,
//! `is_primary`, `display_order`, paging) are applied during deserialization.
//! Update payloads keep every field optional; nullable columns use
//! `Option<Option<T>>` so that an explicit `null` clears the stored value
//! while an absent key leaves it untouched.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::{ContactType, NewsCategory, PageType};
use super::validate::{
    double_option, require_at_least, require_text, require_url, Validate, ValidationError,
};

/// Page size used by `get_news_articles` when the caller gives none.
pub const DEFAULT_NEWS_LIMIT: u32 = 10;

fn default_news_limit() -> u32 {
    DEFAULT_NEWS_LIMIT
}

fn default_true() -> bool {
    true
}

// ============================================================================
// News Articles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNewsArticleInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Defaults to the moment of insertion when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_featured: bool,
    pub category: NewsCategory,
}

impl Validate for CreateNewsArticleInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        Ok(())
    }
}

/// Filter and paging for the news list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetNewsArticlesInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<NewsCategory>,
    #[serde(default = "default_news_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Default for GetNewsArticlesInput {
    fn default() -> Self {
        Self {
            category: None,
            limit: DEFAULT_NEWS_LIMIT,
            offset: 0,
        }
    }
}

impl Validate for GetNewsArticlesInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_at_least("limit", i64::from(self.limit), 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNewsArticleInput {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<NewsCategory>,
}

impl Validate for UpdateNewsArticleInput {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content)?;
        }
        Ok(())
    }
}

// ============================================================================
// Gallery Items
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGalleryItemInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
}

impl Validate for CreateGalleryItemInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_url("image_url", &self.image_url)?;
        if let Some(thumbnail_url) = &self.thumbnail_url {
            require_url("thumbnail_url", thumbnail_url)?;
        }
        Ok(())
    }
}

// ============================================================================
// Information Pages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInformationPageInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub page_type: PageType,
    #[serde(default = "default_true")]
    pub is_published: bool,
    #[serde(default)]
    pub meta_description: Option<String>,
}

impl Validate for CreateInformationPageInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("slug", &self.slug)?;
        require_text("content", &self.content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInformationPageBySlugInput {
    pub slug: String,
}

impl Validate for GetInformationPageBySlugInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("slug", &self.slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInformationPageInput {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<PageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta_description: Option<Option<String>>,
}

impl Validate for UpdateInformationPageInput {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(slug) = &self.slug {
            require_text("slug", slug)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content)?;
        }
        Ok(())
    }
}

// ============================================================================
// Contact Info
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContactInfoInput {
    pub department: String,
    pub contact_type: ContactType,
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub display_order: u32,
}

impl Validate for CreateContactInfoInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("department", &self.department)?;
        require_text("label", &self.label)?;
        require_text("value", &self.value)?;
        Ok(())
    }
}
