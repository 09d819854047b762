use chrono::Utc;

use super::query::{Direction, Insert, Select, Update};
use super::schema::Database;
use super::types::{convert_rows, to_micros, NewsArticleRow, NEWS_ARTICLES};
use crate::error::{ContentError, ContentResult};
use crate::model::{
    CreateNewsArticleInput, GetNewsArticlesInput, NewsArticle, UpdateNewsArticleInput, Validate,
};

impl Database {
    // ========================================================================
    // News Mutations
    // ========================================================================

    /// Create a news article.
    ///
    /// `published_at` falls back to the time of this call when the input
    /// leaves it out; `created_at` and `updated_at` are always that time.
    pub async fn create_news_article(
        &self,
        input: CreateNewsArticleInput,
    ) -> ContentResult<NewsArticle> {
        input.validate()?;

        let now = Utc::now();
        let published_at = input.published_at.unwrap_or(now);
        let insert = Insert::into_table(NEWS_ARTICLES)
            .value("title", input.title)
            .value("content", input.content)
            .value("summary", input.summary)
            .value("published_at", to_micros(published_at))
            .value("is_featured", input.is_featured)
            .value("category", input.category.as_str())
            .value("created_at", to_micros(now))
            .value("updated_at", to_micros(now));

        let row: NewsArticleRow = self.insert_row(&insert).await?;
        let article = NewsArticle::try_from(row)?;
        tracing::info!(
            id = article.id,
            category = %article.category,
            featured = article.is_featured,
            "Created news article"
        );
        Ok(article)
    }

    /// Apply a partial update to a news article.
    ///
    /// Only fields present in `input` are written; `updated_at` is refreshed
    /// on every call, even when no other field is present.
    ///
    /// # Errors
    ///
    /// `ContentError::NotFound` if no article has `input.id`.
    pub async fn update_news_article(
        &self,
        input: UpdateNewsArticleInput,
    ) -> ContentResult<NewsArticle> {
        input.validate()?;

        let id = input.id;
        let update = Update::table(NEWS_ARTICLES, id)
            .set_if_present("title", input.title)
            .set_if_present("content", input.content)
            .set_if_present("summary", input.summary)
            .set_if_present("published_at", input.published_at.map(to_micros))
            .set_if_present("is_featured", input.is_featured)
            .set_if_present("category", input.category.map(|c| c.as_str()))
            .set("updated_at", to_micros(Utc::now()));

        let row: Option<NewsArticleRow> = self.update_row(&update).await?;
        let row = row.ok_or(ContentError::NotFound {
            entity: NEWS_ARTICLES.entity,
            id,
        })?;
        tracing::info!(id, "Updated news article");
        NewsArticle::try_from(row)
    }

    // ========================================================================
    // News Queries
    // ========================================================================

    /// List news articles, newest `published_at` first.
    ///
    /// `None` behaves like the default filter: every category, first 10 rows.
    /// Articles published at the same instant are ordered by id, newest first,
    /// so pages never overlap.
    pub async fn get_news_articles(
        &self,
        filter: Option<GetNewsArticlesInput>,
    ) -> ContentResult<Vec<NewsArticle>> {
        let filter = filter.unwrap_or_default();
        filter.validate()?;

        let mut query = Select::from_table(NEWS_ARTICLES);
        if let Some(category) = filter.category {
            query = query.filter("category", category.as_str());
        }
        let query = query
            .order_by("published_at", Direction::Desc)
            .order_by("id", Direction::Desc)
            .limit(i64::from(filter.limit))
            .offset(i64::from(filter.offset));

        let rows: Vec<NewsArticleRow> = self.select_rows(&query).await?;
        convert_rows(rows)
    }

    /// All featured articles, newest `published_at` first. Not paginated.
    pub async fn get_featured_news(&self) -> ContentResult<Vec<NewsArticle>> {
        let query = Select::from_table(NEWS_ARTICLES)
            .filter("is_featured", true)
            .order_by("published_at", Direction::Desc)
            .order_by("id", Direction::Desc);

        let rows: Vec<NewsArticleRow> = self.select_rows(&query).await?;
        convert_rows(rows)
    }
}
