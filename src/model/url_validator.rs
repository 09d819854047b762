use thiserror::Error;
use url::Url;

/// Errors that can occur when validating a gallery image URL.
///
/// URLs are stored as opaque strings and handed to the browser as-is, so the
/// only requirement is that they parse and point at an http(s) resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a URL string for use as an image or thumbnail link.
///
/// # Examples
///
/// ```
/// use civic_portal::model::validate_url;
///
/// let url = validate_url("https://cdn.example.org/photos/1.jpg").unwrap();
/// assert_eq!(url.host_str(), Some("cdn.example.org"));
///
/// assert!(validate_url("not a url").is_err());
/// assert!(validate_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}
