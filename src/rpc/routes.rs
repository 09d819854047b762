//! RPC Procedure Routes
//!
//! One route per procedure under `/rpc/<name>`. Queries are `GET` with an
//! optional `?input=<json>` parameter, mutations are `POST` with a JSON body.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::Uri,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::errors::{RpcError, RpcResult};
use crate::model::{
    ContactInfo, GalleryItem, GetInformationPageBySlugInput, GetNewsArticlesInput,
    InformationPage, NewsArticle, Validate,
};
use crate::storage::Database;

// ==================
// Envelope
// ==================

/// Success body: `{"result": {"data": ..}}`
#[derive(Debug, Serialize)]
pub struct RpcResponse<T> {
    pub result: RpcData<T>,
}

#[derive(Debug, Serialize)]
pub struct RpcData<T> {
    pub data: T,
}

type RpcJson<T> = RpcResult<Json<RpcResponse<T>>>;

fn reply<T: Serialize>(data: T) -> RpcJson<T> {
    Ok(Json(RpcResponse {
        result: RpcData { data },
    }))
}

/// Query string of a `GET` procedure
#[derive(Debug, Default, Deserialize)]
pub struct RpcQuery {
    #[serde(default)]
    pub input: Option<String>,
}

/// Decode the optional JSON input of a query procedure.
///
/// A missing, blank or `null` input decodes to `None`.
fn query_input<T: DeserializeOwned>(query: &RpcQuery) -> RpcResult<Option<T>> {
    match query.input.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => serde_json::from_str::<Option<T>>(raw).map_err(RpcError::malformed),
    }
}

fn body_input<T: DeserializeOwned>(body: &Bytes) -> RpcResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RpcError::malformed("request body is empty"));
    }
    serde_json::from_slice(body).map_err(RpcError::malformed)
}

// ==================
// Router
// ==================

/// Every procedure, keyed by name.
pub fn rpc_routes(db: Database) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        // News articles
        .route("/createNewsArticle", post(create_news_article))
        .route("/getNewsArticles", get(get_news_articles))
        .route("/getFeaturedNews", get(get_featured_news))
        .route("/updateNewsArticle", post(update_news_article))
        // Gallery
        .route("/createGalleryItem", post(create_gallery_item))
        .route("/getGalleryItems", get(get_gallery_items))
        // Information pages
        .route("/createInformationPage", post(create_information_page))
        .route("/getInformationPages", get(get_information_pages))
        .route("/getInformationPageBySlug", get(get_information_page_by_slug))
        .route("/updateInformationPage", post(update_information_page))
        // Contact info
        .route("/createContactInfo", post(create_contact_info))
        .route("/getContactInfo", get(get_contact_info))
        .with_state(db)
}

/// Fallback for paths that name no procedure.
pub async fn unknown_procedure(uri: Uri) -> RpcError {
    RpcError::UnknownProcedure(uri.path().to_string())
}

// ==================
// Handlers
// ==================

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn healthcheck() -> RpcJson<HealthStatus> {
    reply(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn create_news_article(State(db): State<Database>, body: Bytes) -> RpcJson<NewsArticle> {
    let input = body_input(&body)?;
    reply(db.create_news_article(input).await?)
}

async fn get_news_articles(
    State(db): State<Database>,
    Query(query): Query<RpcQuery>,
) -> RpcJson<Vec<NewsArticle>> {
    let filter: Option<GetNewsArticlesInput> = query_input(&query)?;
    reply(db.get_news_articles(filter).await?)
}

async fn get_featured_news(State(db): State<Database>) -> RpcJson<Vec<NewsArticle>> {
    reply(db.get_featured_news().await?)
}

async fn update_news_article(State(db): State<Database>, body: Bytes) -> RpcJson<NewsArticle> {
    let input = body_input(&body)?;
    reply(db.update_news_article(input).await?)
}

async fn create_gallery_item(State(db): State<Database>, body: Bytes) -> RpcJson<GalleryItem> {
    let input = body_input(&body)?;
    reply(db.create_gallery_item(input).await?)
}

async fn get_gallery_items(State(db): State<Database>) -> RpcJson<Vec<GalleryItem>> {
    reply(db.get_gallery_items().await?)
}

async fn create_information_page(
    State(db): State<Database>,
    body: Bytes,
) -> RpcJson<InformationPage> {
    let input = body_input(&body)?;
    reply(db.create_information_page(input).await?)
}

async fn get_information_pages(State(db): State<Database>) -> RpcJson<Vec<InformationPage>> {
    reply(db.get_information_pages().await?)
}

/// Not-found is a successful `null`, never an error.
async fn get_information_page_by_slug(
    State(db): State<Database>,
    Query(query): Query<RpcQuery>,
) -> RpcJson<Option<InformationPage>> {
    let input: GetInformationPageBySlugInput = query_input(&query)?
        .ok_or_else(|| RpcError::malformed("input with a slug is required"))?;
    input.validate()?;
    reply(db.get_information_page_by_slug(&input.slug).await?)
}

async fn update_information_page(
    State(db): State<Database>,
    body: Bytes,
) -> RpcJson<InformationPage> {
    let input = body_input(&body)?;
    reply(db.update_information_page(input).await?)
}

async fn create_contact_info(State(db): State<Database>, body: Bytes) -> RpcJson<ContactInfo> {
    let input = body_input(&body)?;
    reply(db.create_contact_info(input).await?)
}

async fn get_contact_info(State(db): State<Database>) -> RpcJson<Vec<ContactInfo>> {
    reply(db.get_contact_info().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_input_absent_or_null() {
        let none: Option<GetNewsArticlesInput> = query_input(&RpcQuery::default()).unwrap();
        assert!(none.is_none());

        let null = RpcQuery {
            input: Some("null".to_string()),
        };
        assert!(query_input::<GetNewsArticlesInput>(&null).unwrap().is_none());
    }

    #[test]
    fn test_query_input_decodes_filter() {
        let query = RpcQuery {
            input: Some(r#"{"category":"regulation","limit":3}"#.to_string()),
        };
        let filter: GetNewsArticlesInput = query_input(&query).unwrap().unwrap();
        assert_eq!(filter.limit, 3);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn test_query_input_rejects_unknown_enum() {
        let query = RpcQuery {
            input: Some(r#"{"category":"gossip"}"#.to_string()),
        };
        let err = query_input::<GetNewsArticlesInput>(&query).unwrap_err();
        assert!(matches!(err, RpcError::Input(_)));
    }

    #[test]
    fn test_body_input_rejects_empty_body() {
        let err = body_input::<GetInformationPageBySlugInput>(&Bytes::from_static(b"  ")).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_envelope_shape() {
        let Json(body) = reply(vec![1, 2]).unwrap();
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"result": {"data": [1, 2]}})
        );
    }
}
