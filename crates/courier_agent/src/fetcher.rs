//! Content retrieval from the generation service.

use async_trait::async_trait;
use chrono::Utc;
use courier_core::ContentItem;
use courier_error::{FetchError, FetchErrorKind};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Anything that can produce the next item to publish.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Retrieve one content item.
    ///
    /// # Errors
    ///
    /// - `Unreachable` for transient transport or server failures
    /// - `InvalidPayload` when the response cannot be used
    async fn fetch_content(&self) -> Result<ContentItem, FetchError>;
}

/// Structured payload the generation service may return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredPayload {
    topic: String,
    forum_post: String,
}

/// Turn a response body into a content item.
///
/// A JSON object carrying `topic` and `forumPost` becomes a titled item.
/// Any other JSON object is rejected. Everything else is posted verbatim as
/// the body.
///
/// # Examples
///
/// ```
/// use courier_agent::parse_payload;
///
/// let item = parse_payload(r#"{"topic": "Weekly", "forumPost": "Hello"}"#).unwrap();
/// assert_eq!(item.title().as_deref(), Some("Weekly"));
/// assert_eq!(item.body(), "Hello");
///
/// let plain = parse_payload("  Just text  ").unwrap();
/// assert!(plain.title().is_none());
/// assert_eq!(plain.body(), "Just text");
///
/// assert!(parse_payload("   ").is_err());
/// ```
pub fn parse_payload(raw: &str) -> Result<ContentItem, FetchError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(FetchError::new(FetchErrorKind::InvalidPayload(
            "empty response body".to_string(),
        )));
    }

    if text.starts_with('{') {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            // Braced prose rather than JSON.
            Err(_) => return Ok(ContentItem::new(None, text, Utc::now())),
        };
        let payload: StructuredPayload = serde_json::from_value(value).map_err(|e| {
            FetchError::new(FetchErrorKind::InvalidPayload(format!(
                "structured payload missing fields: {}",
                e
            )))
        })?;
        let topic = payload.topic.trim();
        let body = payload.forum_post.trim();
        if topic.is_empty() || body.is_empty() {
            return Err(FetchError::new(FetchErrorKind::InvalidPayload(
                "structured payload has an empty topic or forumPost".to_string(),
            )));
        }
        return Ok(ContentItem::new(Some(topic.to_string()), body, Utc::now()));
    }

    Ok(ContentItem::new(None, text, Utc::now()))
}

/// Fetches content with an HTTP GET against the generation endpoint.
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpContentFetcher {
    /// Create a fetcher with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::new(FetchErrorKind::Unreachable(e.to_string())))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint this fetcher reads from.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentSource for HttpContentFetcher {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_content(&self) -> Result<ContentItem, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| FetchError::new(FetchErrorKind::Unreachable(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let reason = format!("generation endpoint returned {}", status);
            let kind = if status.is_server_error()
                || status == reqwest::StatusCode::REQUEST_TIMEOUT
                || status == reqwest::StatusCode::TOO_MANY_REQUESTS
            {
                FetchErrorKind::Unreachable(reason)
            } else {
                FetchErrorKind::InvalidPayload(reason)
            };
            return Err(FetchError::new(kind));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(FetchErrorKind::Unreachable(e.to_string())))?;
        debug!(bytes = body.len(), "Fetched payload");

        let item = parse_payload(&body)?;
        debug!(reference = item.source_reference().short(), "Parsed content item");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_error::RetryableError;

    #[test]
    fn test_object_without_fields_is_invalid() {
        let err = parse_payload(r#"{"message": "hi"}"#).unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::InvalidPayload(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_braced_prose_is_plain_text() {
        let item = parse_payload("{not json} but still a post").unwrap();
        assert!(item.title().is_none());
        assert_eq!(item.body(), "{not json} but still a post");
    }

    #[test]
    fn test_blank_forum_post_is_invalid() {
        let err = parse_payload(r#"{"topic": "T", "forumPost": "  "}"#).unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::InvalidPayload(_)));
    }

    #[test]
    fn test_same_body_same_reference() {
        let a = parse_payload("Hello").unwrap();
        let b = parse_payload("Hello\n").unwrap();
        assert_eq!(a.source_reference(), b.source_reference());
    }
}
