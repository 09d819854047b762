mod contacts;
mod gallery;
mod news;
mod pages;
mod query;
mod schema;
mod types;

pub use schema::{Database, DEFAULT_MAX_CONNECTIONS};
pub use types::DatabaseError;
