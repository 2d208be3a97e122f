//! Content items handed from the fetcher to the publisher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content hash used to recognise a repeated item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}", _0)]
pub struct SourceReference(String);

impl SourceReference {
    /// SHA-256 over the optional title and the body.
    ///
    /// The title is tagged and length-prefixed, so no choice of title and
    /// body can collide with a different split of the same bytes.
    pub fn of(title: Option<&str>, body: &str) -> Self {
        let mut hasher = Sha256::new();
        match title {
            Some(title) => {
                hasher.update([1u8]);
                hasher.update((title.len() as u64).to_le_bytes());
                hasher.update(title.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update(body.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First twelve hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

/// One piece of generated content.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use courier_core::ContentItem;
///
/// let a = ContentItem::new(None, "Hello", Utc::now());
/// let b = ContentItem::new(None, "Hello", Utc::now());
/// let c = ContentItem::new(None, "World", Utc::now());
///
/// assert_eq!(a.source_reference(), b.source_reference());
/// assert_ne!(a.source_reference(), c.source_reference());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ContentItem {
    /// Optional headline, present for structured payloads.
    title: Option<String>,
    /// Text to post.
    body: String,
    /// When the item was retrieved.
    fetched_at: DateTime<Utc>,
    /// Content hash.
    source_reference: SourceReference,
}

impl ContentItem {
    /// Build an item, stamping its content hash.
    pub fn new(title: Option<String>, body: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        let body = body.into();
        let source_reference = SourceReference::of(title.as_deref(), &body);
        Self {
            title,
            body,
            fetched_at,
            source_reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_participates_in_hash() {
        let untitled = SourceReference::of(None, "body");
        let titled = SourceReference::of(Some("title"), "body");
        assert_ne!(untitled, titled);
    }

    #[test]
    fn test_separator_prevents_collisions() {
        assert_ne!(
            SourceReference::of(Some("ab"), "c"),
            SourceReference::of(Some("a"), "bc")
        );
    }

    #[test]
    fn test_nul_in_title_cannot_mimic_untitled_body() {
        assert_ne!(
            SourceReference::of(Some("\0a"), "b"),
            SourceReference::of(None, "a\0b")
        );
        assert_ne!(
            SourceReference::of(Some(""), "body"),
            SourceReference::of(None, "body")
        );
    }

    #[test]
    fn test_short_reference() {
        let reference = SourceReference::of(None, "Hello");
        assert_eq!(reference.short().len(), 12);
        assert!(reference.as_str().starts_with(reference.short()));
        assert_eq!(reference.as_str().len(), 64);
    }
}
