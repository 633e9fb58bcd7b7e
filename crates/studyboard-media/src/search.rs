//! Site-scoped music search over the Google Custom Search JSON API.

use crate::error::{MediaError, MediaResult};
use crate::http::{build_client, get_text, url_with_params};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Site results are restricted to unless configured otherwise.
pub const DEFAULT_SITE: &str = "soundcloud.com";

/// Links with fewer `/`-separated parts point at artist pages, not tracks
/// or playlists.
const MIN_LINK_PARTS: usize = 5;

/// One playable search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    /// Cover image URL, if the search engine has one.
    pub thumbnail: Option<String>,
}

/// Search credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub api_key: String,
    /// Programmable search engine id.
    pub engine_id: String,
    pub site: String,
}

impl SearchConfig {
    /// Read `STUDYBOARD_SEARCH_KEY`, `STUDYBOARD_SEARCH_CX` and the optional
    /// `STUDYBOARD_SEARCH_SITE`.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::MissingConfig`] if a required variable is unset.
    pub fn from_env() -> MediaResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MediaResult<Self> {
        let required = |var: &str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| MediaError::MissingConfig { var: var.into() })
        };
        Ok(Self {
            api_key: required("STUDYBOARD_SEARCH_KEY")?,
            engine_id: required("STUDYBOARD_SEARCH_CX")?,
            site: lookup("STUDYBOARD_SEARCH_SITE").unwrap_or_else(|| DEFAULT_SITE.to_string()),
        })
    }
}

/// Anything that can turn a query into search results.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> MediaResult<Vec<SearchResult>>;
}

pub struct GoogleSearchClient {
    http: reqwest::Client,
    config: SearchConfig,
    endpoint: String,
}

impl GoogleSearchClient {
    pub fn new(config: SearchConfig) -> MediaResult<Self> {
        Ok(Self {
            http: build_client()?,
            config,
            endpoint: SEARCH_ENDPOINT.to_string(),
        })
    }

    /// Point the client at a different endpoint (e.g. a local mock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn scoped_query(&self, query: &str) -> String {
        if self.config.site.is_empty() {
            query.to_string()
        } else {
            format!("site:{} {}", self.config.site, query)
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str) -> MediaResult<Vec<SearchResult>> {
        let q = self.scoped_query(query);
        let url = url_with_params(
            &self.endpoint,
            &[
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.engine_id.as_str()),
                ("q", q.as_str()),
            ],
        )?;
        let text = get_text(&self.http, url).await?;
        parse_search_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
    pagemap: Option<PageMap>,
}

#[derive(Deserialize)]
struct PageMap {
    #[serde(default)]
    cse_image: Vec<CseImage>,
}

#[derive(Deserialize)]
struct CseImage {
    src: Option<String>,
}

/// Parse a Custom Search response body.
///
/// Missing `items` yields an empty list; items without a link, and links to
/// artist pages, are dropped.
///
/// # Errors
///
/// Returns [`MediaError::Parse`] if the body is not JSON of the expected shape.
pub fn parse_search_response(text: &str) -> MediaResult<Vec<SearchResult>> {
    let response: SearchResponse =
        serde_json::from_str(text).map_err(|e| MediaError::Parse(e.to_string()))?;

    let results = response
        .items
        .into_iter()
        .filter_map(|item| {
            let link = item.link?;
            if link.split('/').count() < MIN_LINK_PARTS {
                return None;
            }
            let thumbnail = item
                .pagemap
                .and_then(|pagemap| pagemap.cse_image.into_iter().next())
                .and_then(|image| image.src);
            Some(SearchResult {
                title: item.title.unwrap_or_else(|| link.clone()),
                link,
                thumbnail,
            })
        })
        .collect();
    Ok(results)
}
