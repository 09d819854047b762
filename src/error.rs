use thiserror::Error;

use crate::model::ValidationError;

// ============================================================================
// Error Types
// ============================================================================

/// Failure of a content operation, reported synchronously to its caller.
///
/// Read operations never produce `NotFound`: an empty list or `None` is a
/// normal result for them.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The input failed shape or constraint checks; storage was not touched.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An update targeted an id that has no row.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The slug is already owned by another information page.
    #[error("Information page with slug '{slug}' already exists")]
    Conflict { slug: String },

    /// A stored row holds a value the model cannot represent.
    #[error("Corrupt {entity} row: {reason}")]
    InvalidRow { entity: &'static str, reason: String },

    /// The underlying database failed.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type ContentResult<T> = Result<T, ContentError>;

impl ContentError {
    /// Map a write failure on `information_pages`, turning a violation of the
    /// `slug` unique constraint into [`ContentError::Conflict`].
    ///
    /// Two writers can both pass the slug pre-check; the constraint decides
    /// which of them wins.
    pub(crate) fn from_slug_write(err: sqlx::Error, slug: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return ContentError::Conflict {
                    slug: slug.to_owned(),
                };
            }
        }
        ContentError::Storage(err)
    }

    /// True when retrying the same call cannot succeed without changing input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ContentError::Validation(_) | ContentError::NotFound { .. } | ContentError::Conflict { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_slug() {
        let err = ContentError::Conflict {
            slug: "parking-permits".to_string(),
        };
        assert!(err.to_string().contains("'parking-permits'"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_not_found_message() {
        let err = ContentError::NotFound {
            entity: "News article",
            id: 42,
        };
        assert_eq!(err.to_string(), "News article with id 42 not found");
    }

    #[test]
    fn test_non_database_write_error_stays_storage() {
        let err = ContentError::from_slug_write(sqlx::Error::RowNotFound, "about");
        assert!(matches!(err, ContentError::Storage(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = ContentError::from(ValidationError::Empty { field: "title" });
        assert_eq!(err.to_string(), "title must not be empty");
    }
}
