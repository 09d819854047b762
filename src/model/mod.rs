//! Entity shapes, request payloads and their validation rules.
//!
//! Everything a handler receives passes through [`Validate`] before the
//! storage layer is touched.

mod entities;
mod inputs;
mod url_validator;
mod validate;

pub use entities::{
    ContactInfo, ContactType, GalleryItem, InformationPage, NewsArticle, NewsCategory, PageType,
    UnknownVariant,
};
pub use inputs::{
    CreateContactInfoInput, CreateGalleryItemInput, CreateInformationPageInput,
    CreateNewsArticleInput, GetInformationPageBySlugInput, GetNewsArticlesInput,
    UpdateInformationPageInput, UpdateNewsArticleInput, DEFAULT_NEWS_LIMIT,
};
pub use url_validator::{validate_url, UrlValidationError};
pub use validate::{Validate, ValidationError};

pub(crate) use validate::require_text;
