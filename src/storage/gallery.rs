use chrono::Utc;

use super::query::{Direction, Insert, Select};
use super::schema::Database;
use super::types::{convert_rows, to_micros, GalleryItemRow, GALLERY_ITEMS};
use crate::error::ContentResult;
use crate::model::{CreateGalleryItemInput, GalleryItem, Validate};

impl Database {
    // ========================================================================
    // Gallery Operations
    // ========================================================================

    /// Add a photo to the gallery. Both URLs are stored verbatim.
    pub async fn create_gallery_item(
        &self,
        input: CreateGalleryItemInput,
    ) -> ContentResult<GalleryItem> {
        input.validate()?;

        let insert = Insert::into_table(GALLERY_ITEMS)
            .value("title", input.title)
            .value("description", input.description)
            .value("image_url", input.image_url)
            .value("thumbnail_url", input.thumbnail_url)
            .value("category", input.category)
            .value("taken_at", input.taken_at.map(to_micros))
            .value("created_at", to_micros(Utc::now()));

        let row: GalleryItemRow = self.insert_row(&insert).await?;
        let item = GalleryItem::try_from(row)?;
        tracing::info!(id = item.id, "Created gallery item");
        Ok(item)
    }

    /// Every gallery item, most recently added first.
    pub async fn get_gallery_items(&self) -> ContentResult<Vec<GalleryItem>> {
        let query = Select::from_table(GALLERY_ITEMS)
            .order_by("created_at", Direction::Desc)
            .order_by("id", Direction::Desc);

        let rows: Vec<GalleryItemRow> = self.select_rows(&query).await?;
        convert_rows(rows)
    }
}
