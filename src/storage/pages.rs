use chrono::Utc;

use super::query::{Direction, Insert, Select, Update};
use super::schema::Database;
use super::types::{convert_rows, to_micros, InformationPageRow, INFORMATION_PAGES};
use crate::error::{ContentError, ContentResult};
use crate::model::{
    require_text, CreateInformationPageInput, InformationPage, UpdateInformationPageInput,
    Validate,
};

impl Database {
    // ========================================================================
    // Information Page Mutations
    // ========================================================================

    /// Create an information page.
    ///
    /// # Errors
    ///
    /// `ContentError::Conflict` if another page already uses `input.slug`,
    /// whether caught by the pre-check or by the column's unique constraint.
    pub async fn create_information_page(
        &self,
        input: CreateInformationPageInput,
    ) -> ContentResult<InformationPage> {
        input.validate()?;

        if self.slug_taken(&input.slug, None).await? {
            tracing::warn!(slug = %input.slug, "Rejected information page with duplicate slug");
            return Err(ContentError::Conflict { slug: input.slug });
        }

        let now = to_micros(Utc::now());
        let slug = input.slug;
        let insert = Insert::into_table(INFORMATION_PAGES)
            .value("title", input.title)
            .value("slug", slug.as_str())
            .value("content", input.content)
            .value("page_type", input.page_type.as_str())
            .value("is_published", input.is_published)
            .value("meta_description", input.meta_description)
            .value("created_at", now)
            .value("updated_at", now);

        let row: InformationPageRow = self
            .insert_row(&insert)
            .await
            .map_err(|e| ContentError::from_slug_write(e, &slug))?;
        let page = InformationPage::try_from(row)?;
        tracing::info!(id = page.id, slug = %page.slug, "Created information page");
        Ok(page)
    }

    /// Apply a partial update to an information page.
    ///
    /// A new `slug` must not belong to any *other* page; re-submitting the
    /// page's own slug is accepted. `updated_at` is refreshed on every call.
    ///
    /// # Errors
    ///
    /// `ContentError::NotFound` if no page has `input.id` (checked before the
    /// slug), `ContentError::Conflict` if the slug is owned by another page.
    pub async fn update_information_page(
        &self,
        input: UpdateInformationPageInput,
    ) -> ContentResult<InformationPage> {
        input.validate()?;

        let id = input.id;
        let not_found = || ContentError::NotFound {
            entity: INFORMATION_PAGES.entity,
            id,
        };

        let exists = self
            .row_exists(&Select::from_table(INFORMATION_PAGES).filter("id", id))
            .await?;
        if !exists {
            return Err(not_found());
        }

        if let Some(slug) = &input.slug {
            if self.slug_taken(slug, Some(id)).await? {
                tracing::warn!(id, slug = %slug, "Rejected information page slug change");
                return Err(ContentError::Conflict { slug: slug.clone() });
            }
        }

        let new_slug = input.slug.clone();
        let update = Update::table(INFORMATION_PAGES, id)
            .set_if_present("title", input.title)
            .set_if_present("slug", input.slug)
            .set_if_present("content", input.content)
            .set_if_present("page_type", input.page_type.map(|t| t.as_str()))
            .set_if_present("is_published", input.is_published)
            .set_if_present("meta_description", input.meta_description)
            .set("updated_at", to_micros(Utc::now()));

        let row: Option<InformationPageRow> = self.update_row(&update).await.map_err(|e| match &new_slug {
            Some(slug) => ContentError::from_slug_write(e, slug),
            None => ContentError::Storage(e),
        })?;
        let page = InformationPage::try_from(row.ok_or_else(not_found)?)?;
        tracing::info!(id, slug = %page.slug, "Updated information page");
        Ok(page)
    }

    /// True if a page other than `except_id` already uses `slug`.
    async fn slug_taken(&self, slug: &str, except_id: Option<i64>) -> ContentResult<bool> {
        let mut query = Select::from_table(INFORMATION_PAGES).filter("slug", slug);
        if let Some(id) = except_id {
            query = query.exclude("id", id);
        }
        Ok(self.row_exists(&query).await?)
    }

    // ========================================================================
    // Information Page Queries
    // ========================================================================

    /// Published pages ordered by title.
    ///
    /// Titles compare with SQLite's BINARY collation: byte order, so
    /// uppercase sorts before lowercase ("Zoning" < "about").
    pub async fn get_information_pages(&self) -> ContentResult<Vec<InformationPage>> {
        let query = Select::from_table(INFORMATION_PAGES)
            .filter("is_published", true)
            .order_by("title", Direction::Asc)
            .order_by("id", Direction::Asc);

        let rows: Vec<InformationPageRow> = self.select_rows(&query).await?;
        convert_rows(rows)
    }

    /// Look up a published page by slug.
    ///
    /// Returns `Ok(None)` both when the slug is unknown and when the page
    /// exists but is unpublished; callers cannot tell the two apart.
    pub async fn get_information_page_by_slug(
        &self,
        slug: &str,
    ) -> ContentResult<Option<InformationPage>> {
        require_text("slug", slug)?;

        let query = Select::from_table(INFORMATION_PAGES)
            .filter("slug", slug)
            .filter("is_published", true);

        let row: Option<InformationPageRow> = self.select_row(&query).await?;
        row.map(InformationPage::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::ContentError;
    use crate::model::{
        CreateInformationPageInput, PageType, UpdateInformationPageInput, ValidationError,
    };
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn test_page(title: &str, slug: &str) -> CreateInformationPageInput {
        CreateInformationPageInput {
            title: title.to_string(),
            slug: slug.to_string(),
            content: format!("Content for {}", title),
            page_type: PageType::Service,
            is_published: true,
            meta_description: Some(format!("About {}", title)),
        }
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let db = test_db().await;
        let input = test_page("Waste Collection", "waste-collection");

        let page = db.create_information_page(input.clone()).await.unwrap();
        assert!(page.id > 0);
        assert_eq!(page.title, input.title);
        assert_eq!(page.slug, input.slug);
        assert_eq!(page.content, input.content);
        assert_eq!(page.page_type, PageType::Service);
        assert!(page.is_published);
        assert_eq!(page.meta_description, input.meta_description);
        assert_eq!(page.created_at, page.updated_at);

        let fetched = db
            .get_information_page_by_slug("waste-collection")
            .await
            .unwrap();
        assert_eq!(fetched, Some(page));
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_conflicts() {
        let db = test_db().await;
        db.create_information_page(test_page("First", "dup"))
            .await
            .unwrap();

        let err = db
            .create_information_page(test_page("Second", "dup"))
            .await
            .unwrap_err();
        match err {
            ContentError::Conflict { slug } => assert_eq!(slug, "dup"),
            other => panic!("expected Conflict, got {other:?}"),
        }

        // Duplicate against an unpublished page still conflicts
        let mut hidden = test_page("Hidden", "hidden");
        hidden.is_published = false;
        db.create_information_page(hidden).await.unwrap();
        assert!(matches!(
            db.create_information_page(test_page("Again", "hidden")).await,
            Err(ContentError::Conflict { .. })
        ));

        assert_eq!(db.get_information_pages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let db = test_db().await;
        db.create_information_page(test_page("Taken", "taken"))
            .await
            .unwrap();

        // A writer that raced past the pre-check hits the constraint instead
        let err = sqlx::query(
            "INSERT INTO information_pages (title, slug, content, page_type, created_at, updated_at) \
             VALUES ('Racer', 'taken', 'x', 'general', 0, 0)",
        )
        .execute(&db.pool)
        .await
        .unwrap_err();
        let mapped = ContentError::from_slug_write(err, "taken");
        assert!(matches!(mapped, ContentError::Conflict { slug } if slug == "taken"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_slug() {
        let db = test_db().await;
        let err = db
            .create_information_page(test_page("No slug", " "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContentError::Validation(ValidationError::Empty { field: "slug" })
        ));
    }

    #[tokio::test]
    async fn test_list_only_published_sorted_by_title() {
        let db = test_db().await;
        db.create_information_page(test_page("Parking", "parking"))
            .await
            .unwrap();
        db.create_information_page(test_page("About the City", "about"))
            .await
            .unwrap();
        let mut draft = test_page("Budget Draft", "budget-draft");
        draft.is_published = false;
        db.create_information_page(draft).await.unwrap();
        db.create_information_page(test_page("Libraries", "libraries"))
            .await
            .unwrap();

        let titles: Vec<String> = db
            .get_information_pages()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["About the City", "Libraries", "Parking"]);
    }

    #[tokio::test]
    async fn test_title_order_is_case_sensitive() {
        let db = test_db().await;
        db.create_information_page(test_page("apply online", "apply"))
            .await
            .unwrap();
        db.create_information_page(test_page("Zoning", "zoning"))
            .await
            .unwrap();

        let titles: Vec<String> = db
            .get_information_pages()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Zoning", "apply online"]);
    }

    #[tokio::test]
    async fn test_by_slug_hides_unpublished_and_unknown() {
        let db = test_db().await;
        let mut draft = test_page("Draft", "draft");
        draft.is_published = false;
        db.create_information_page(draft).await.unwrap();

        assert_eq!(db.get_information_page_by_slug("draft").await.unwrap(), None);
        assert_eq!(
            db.get_information_page_by_slug("never-existed").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_by_slug_rejects_empty_slug() {
        let db = test_db().await;
        assert!(matches!(
            db.get_information_page_by_slug("").await,
            Err(ContentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_slug_to_other_pages_slug_conflicts() {
        let db = test_db().await;
        db.create_information_page(test_page("One", "one"))
            .await
            .unwrap();
        let two = db
            .create_information_page(test_page("Two", "two"))
            .await
            .unwrap();

        let err = db
            .update_information_page(UpdateInformationPageInput {
                id: two.id,
                slug: Some("one".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Conflict { slug } if slug == "one"));

        // Unchanged after the failed update
        let still = db.get_information_page_by_slug("two").await.unwrap().unwrap();
        assert_eq!(still.updated_at, two.updated_at);
    }

    #[tokio::test]
    async fn test_update_to_own_slug_succeeds() {
        let db = test_db().await;
        let page = db
            .create_information_page(test_page("Self", "self"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = db
            .update_information_page(UpdateInformationPageInput {
                id: page.id,
                slug: Some("self".to_string()),
                title: Some("Self, renamed".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.slug, "self");
        assert_eq!(updated.title, "Self, renamed");
        assert!(updated.updated_at > page.updated_at);
    }

    #[tokio::test]
    async fn test_update_to_novel_slug_moves_lookup() {
        let db = test_db().await;
        let page = db
            .create_information_page(test_page("Moving", "old-slug"))
            .await
            .unwrap();

        db.update_information_page(UpdateInformationPageInput {
            id: page.id,
            slug: Some("new-slug".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(db.get_information_page_by_slug("old-slug").await.unwrap(), None);
        assert!(db
            .get_information_page_by_slug("new-slug")
            .await
            .unwrap()
            .is_some());

        // The freed slug can be reused
        db.create_information_page(test_page("Reuse", "old-slug"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let db = test_db().await;
        db.create_information_page(test_page("Exists", "exists"))
            .await
            .unwrap();

        // Not-found wins over a colliding slug
        let err = db
            .update_information_page(UpdateInformationPageInput {
                id: 404,
                slug: Some("exists".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { id: 404, .. }));
    }

    #[tokio::test]
    async fn test_unpublish_then_meta_clear() {
        let db = test_db().await;
        let page = db
            .create_information_page(test_page("Temporary", "temporary"))
            .await
            .unwrap();

        let updated = db
            .update_information_page(UpdateInformationPageInput {
                id: page.id,
                is_published: Some(false),
                meta_description: Some(None),
                page_type: Some(PageType::General),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!updated.is_published);
        assert_eq!(updated.meta_description, None);
        assert_eq!(updated.page_type, PageType::General);
        assert_eq!(updated.content, page.content);

        assert_eq!(
            db.get_information_page_by_slug("temporary").await.unwrap(),
            None
        );
        assert!(db.get_information_pages().await.unwrap().is_empty());
    }
}
