//! Catalog search client abstraction and the iTunes implementation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GalleryError;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://itunes.apple.com/search";
pub const DEFAULT_RESULT_LIMIT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaCategory {
    #[default]
    Music,
    Movie,
    Podcast,
    MusicVideo,
    Audiobook,
    ShortFilm,
    TvShow,
    Software,
    Ebook,
    All,
}

impl MediaCategory {
    pub const ALL: [Self; 10] = [
        Self::Music,
        Self::Movie,
        Self::Podcast,
        Self::MusicVideo,
        Self::Audiobook,
        Self::ShortFilm,
        Self::TvShow,
        Self::Software,
        Self::Ebook,
        Self::All,
    ];

    /// Wire name used in the `media` query parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Movie => "movie",
            Self::Podcast => "podcast",
            Self::MusicVideo => "musicVideo",
            Self::Audiobook => "audiobook",
            Self::ShortFilm => "shortFilm",
            Self::TvShow => "tvShow",
            Self::Software => "software",
            Self::Ebook => "ebook",
            Self::All => "all",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unknown media category '{0}' (expected one of: {names})",
    names = MediaCategory::ALL.map(|c| c.as_str()).join(", ")
)]
pub struct UnknownMediaCategory(pub String);

impl FromStr for MediaCategory {
    type Err = UnknownMediaCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownMediaCategory(raw.to_string()))
    }
}

/// What the user asked for. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    #[serde(default)]
    pub media: MediaCategory,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, media: MediaCategory) -> Self {
        Self {
            term: term.into(),
            media,
        }
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new("lana del rey", MediaCategory::Music)
    }
}

/// A fully resolved search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    query: SearchQuery,
    limit: u32,
    uri: Url,
}

impl SearchRequest {
    /// Resolve `query` against `endpoint`; the term is form-encoded.
    pub fn new(endpoint: &Url, query: SearchQuery, limit: u32) -> Self {
        let mut uri = endpoint.clone();
        uri.query_pairs_mut()
            .clear()
            .append_pair("term", &query.term)
            .append_pair("media", query.media.as_str())
            .append_pair("limit", &limit.to_string());
        Self { query, limit, uri }
    }

    #[must_use]
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.uri
    }
}

/// Undecoded answer from the catalog, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub uri: String,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(GET {}) {}", self.uri, self.status)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn decode(body: &str) -> Result<Self, GalleryError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// One catalog record; only the artwork reference is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub wrapper_type: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default, rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
}

/// Issues one blocking search per call.
///
/// Implementations must not be called from an async context; the loader
/// runs them on a blocking worker.
pub trait CatalogClient: Send + Sync {
    fn search(&self, request: &SearchRequest) -> Result<RawResponse, GalleryError>;
}

/// iTunes Search API client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ItunesClient {
    timeout: Duration,
}

impl ItunesClient {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CatalogClient for ItunesClient {
    fn search(&self, request: &SearchRequest) -> Result<RawResponse, GalleryError> {
        // The blocking client owns a runtime, so it is created and dropped on
        // the calling worker thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GalleryError::Transport(format!("failed to create HTTP client: {e}")))?;

        let response = client
            .get(request.uri().clone())
            .send()
            .map_err(|e| GalleryError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let uri = response.url().to_string();
        let body = response
            .text()
            .map_err(|e| GalleryError::Transport(format!("failed to read response: {e}")))?;

        Ok(RawResponse { uri, status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_categories_round_trip_through_wire_names() {
        for category in MediaCategory::ALL {
            assert_eq!(category.as_str().parse::<MediaCategory>(), Ok(category));
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
        assert_eq!("MUSICVIDEO".parse::<MediaCategory>(), Ok(MediaCategory::MusicVideo));
        assert!("vinyl".parse::<MediaCategory>().is_err());
    }

    #[test]
    fn request_uri_encodes_term_and_fixes_limit() {
        let endpoint = Url::parse(DEFAULT_SEARCH_ENDPOINT).unwrap();
        let request = SearchRequest::new(
            &endpoint,
            SearchQuery::new("lana del rey", MediaCategory::Music),
            DEFAULT_RESULT_LIMIT,
        );
        assert_eq!(
            request.uri().as_str(),
            "https://itunes.apple.com/search?term=lana+del+rey&media=music&limit=200"
        );
    }

    #[test]
    fn request_uri_escapes_reserved_characters() {
        let endpoint = Url::parse("http://localhost:8080/search?stale=1").unwrap();
        let request = SearchRequest::new(
            &endpoint,
            SearchQuery::new("AC/DC & friends", MediaCategory::MusicVideo),
            50,
        );
        assert_eq!(
            request.uri().query(),
            Some("term=AC%2FDC+%26+friends&media=musicVideo&limit=50")
        );
    }

    #[test]
    fn decodes_search_payload_and_ignores_unknown_fields() {
        let body = r#"{
            "resultCount": 2,
            "results": [
                {"wrapperType": "track", "kind": "song", "artworkUrl100": "https://a/1.jpg", "trackName": "x"},
                {"wrapperType": "collection"}
            ]
        }"#;
        let response = SearchResponse::decode(body).unwrap();
        assert_eq!(response.result_count, 2);
        assert_eq!(
            response.results[0].artwork_url_100.as_deref(),
            Some("https://a/1.jpg")
        );
        assert_eq!(response.results[1].artwork_url_100, None);
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let err = SearchResponse::decode("<html>").unwrap_err();
        assert!(matches!(err, GalleryError::Decode(_)));
    }

    #[test]
    fn non_success_statuses_are_flagged() {
        let raw = RawResponse {
            uri: "https://itunes.apple.com/search".into(),
            status: 503,
            body: String::new(),
        };
        assert!(!raw.is_success());
        assert_eq!(raw.to_string(), "(GET https://itunes.apple.com/search) 503");
    }
}
