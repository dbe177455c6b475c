//! Listing model and normalization.
//!
//! Both acquisition paths (parsed HTML fragments and live DOM anchors) hand
//! raw `(href, text)` pairs to [`Listing::from_anchor`], so the two paths
//! always agree on the id space used for deduplication.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Zero-based index of the id among the non-empty path segments of
/// `…/wglink/<category>/<id>/…`.
const ID_SEGMENT_INDEX: usize = 2;

/// Newtype for listing identifiers.
///
/// Always non-empty; only obtainable through [`ListingId::from_href`] or
/// deserialization of previously persisted ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListingId(String);

/// A persisted listing id that is empty or only whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listing id must not be empty")]
pub struct EmptyListingId;

impl TryFrom<String> for ListingId {
    type Error = EmptyListingId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(EmptyListingId);
        }
        Ok(Self(value))
    }
}

impl ListingId {
    /// Extract the listing id from an absolute detail URL.
    ///
    /// Returns `None` when the URL does not parse or has fewer than three
    /// non-empty path segments. Never panics.
    #[must_use]
    pub fn from_href(href: &str) -> Option<Self> {
        let url = Url::parse(href).ok()?;
        url.path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .nth(ID_SEGMENT_INDEX)
            .map(|segment| Self(segment.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ListingId> for String {
    fn from(id: ListingId) -> Self {
        id.0
    }
}

/// A single housing-search result.
///
/// Equality and hashing consider the id only: two anchors pointing at the
/// same listing with different texts are the same listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Stable identifier taken from the detail URL
    pub id: ListingId,
    /// Absolute URL of the detail page
    pub href: String,
    /// Plain-text summary scraped from the anchor
    pub summary: String,
}

impl Listing {
    /// Normalize a raw anchor into a listing.
    ///
    /// `raw_text` may contain markup (inner HTML of the anchor) or plain
    /// text (DOM `innerText`); both normalize to the same summary.
    #[must_use]
    pub fn from_anchor(href: &str, raw_text: &str) -> Option<Self> {
        let id = ListingId::from_href(href)?;
        Some(Self {
            id,
            href: href.to_string(),
            summary: clean_summary(raw_text),
        })
    }
}

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listing {}

impl Hash for Listing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Strip tags, decode entities and collapse whitespace.
#[must_use]
pub fn clean_summary(raw: &str) -> String {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    static SPACE_REGEX: OnceLock<Regex> = OnceLock::new();
    let tags = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    let spaces = SPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let stripped = tags.replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    spaces.replace_all(&decoded, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_detail_url() {
        let cases = [
            ("https://www.wgzimmer.ch/wglink/de/123456/zimmer-in-zuerich.html", "123456"),
            ("https://www.wgzimmer.ch/wglink/en/654321", "654321"),
            ("https://www.wgzimmer.ch//wglink//de//777//", "777"),
            ("http://example.org/wglink/x/abc?ref=1#top", "abc"),
        ];

        for (href, expected) in cases {
            let id = ListingId::from_href(href).expect("id should be extracted");
            assert_eq!(id.as_str(), expected, "for {href}");
        }
    }

    #[test]
    fn test_id_missing_segment() {
        assert!(ListingId::from_href("https://www.wgzimmer.ch/wglink/de").is_none());
        assert!(ListingId::from_href("https://www.wgzimmer.ch/").is_none());
    }

    #[test]
    fn test_id_unparsable_href() {
        let invalid = [
            "www.wgzimmer.ch/wglink/de/123456",
            "/wglink/de/123456",
            "",
            "not a url at all",
        ];

        for href in invalid {
            assert!(ListingId::from_href(href).is_none(), "should reject: {href}");
        }
    }

    #[test]
    fn test_from_anchor_cleans_summary() {
        let listing = Listing::from_anchor(
            "https://www.wgzimmer.ch/wglink/de/123456/room.html",
            "  <strong>Zürich</strong>\n\t<span>CHF 850</span>  &amp; more ",
        )
        .expect("valid listing");

        assert_eq!(listing.id.as_str(), "123456");
        assert_eq!(listing.summary, "Zürich CHF 850 & more");
        assert_eq!(
            listing.href,
            "https://www.wgzimmer.ch/wglink/de/123456/room.html"
        );
    }

    #[test]
    fn test_from_anchor_plain_text_matches_markup() {
        let href = "https://www.wgzimmer.ch/wglink/de/42/x";
        let from_dom = Listing::from_anchor(href, "Zürich\nCHF 850").expect("valid");
        let from_html =
            Listing::from_anchor(href, "<b>Zürich</b><br>CHF 850").expect("valid");
        assert_eq!(from_dom.summary, from_html.summary);
    }

    #[test]
    fn test_from_anchor_rejects_malformed() {
        assert!(Listing::from_anchor("wglink/de/123456", "text").is_none());
    }

    #[test]
    fn test_equality_by_id() {
        let a = Listing::from_anchor("https://a.example/wglink/de/1", "first").expect("valid");
        let b = Listing::from_anchor("https://b.example/wglink/en/1/x", "second").expect("valid");
        assert_eq!(a, b);

        let set: std::collections::HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_listing_id_serialization() {
        let id = ListingId::from_href("https://x.example/wglink/de/99").expect("valid");
        let json = serde_json::to_string(&id).expect("serialize id");
        assert_eq!(json, "\"99\"");

        let back: ListingId = serde_json::from_str(&json).expect("deserialize id");
        assert_eq!(back, id);
    }

    #[test]
    fn test_empty_listing_id_rejected() {
        assert!(serde_json::from_str::<ListingId>("\"\"").is_err());
        assert!(serde_json::from_str::<ListingId>("\"  \"").is_err());
        assert_eq!(
            ListingId::try_from(String::new()),
            Err(EmptyListingId)
        );
    }
}
