//! Resolve a track link into an embeddable player URL.

use crate::error::{MediaError, MediaResult};
use crate::http::{build_client, get_text, url_with_params};
use async_trait::async_trait;
use serde::Deserialize;

const SOUNDCLOUD_OEMBED_ENDPOINT: &str = "https://soundcloud.com/oembed";
const IFRAMELY_ENDPOINT: &str = "https://iframe.ly/api/iframely";

/// Player shown before anything is chosen, and when a chosen track has no
/// embeddable player.
pub const DEFAULT_PLAYER_SRC: &str = "https://w.soundcloud.com/player/?visual=true&url=https%3A%2F%2Fapi.soundcloud.com%2Fplaylists%2F222896338&show_artwork=true";

/// Turns a content link into a player URL.
#[async_trait]
pub trait EmbedProvider: Send + Sync {
    async fn resolve(&self, link: &str) -> MediaResult<String>;
}

/// Pull the `src` attribute out of an embed snippet such as
/// `<iframe width="100%" src="https://w.soundcloud.com/player/?url=..."></iframe>`.
pub fn extract_iframe_src(html: &str) -> Option<&str> {
    const MARKER: &str = "src=\"";
    let start = html.find(MARKER)? + MARKER.len();
    let len = html[start..].find('"')?;
    let src = &html[start..start + len];
    (!src.is_empty()).then_some(src)
}

// =============================================================================
// SOUNDCLOUD OEMBED
// =============================================================================

#[derive(Deserialize)]
struct OEmbedResponse {
    html: Option<String>,
}

/// Parse an oEmbed response and return the player URL from its `html`.
pub fn parse_oembed_response(text: &str) -> MediaResult<String> {
    let response: OEmbedResponse =
        serde_json::from_str(text).map_err(|e| MediaError::Parse(e.to_string()))?;
    response
        .html
        .as_deref()
        .and_then(extract_iframe_src)
        .map(str::to_string)
        .ok_or(MediaError::NoPlayer)
}

pub struct SoundCloudOEmbed {
    http: reqwest::Client,
    endpoint: String,
}

impl SoundCloudOEmbed {
    pub fn new() -> MediaResult<Self> {
        Ok(Self {
            http: build_client()?,
            endpoint: SOUNDCLOUD_OEMBED_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl EmbedProvider for SoundCloudOEmbed {
    async fn resolve(&self, link: &str) -> MediaResult<String> {
        let url = url_with_params(&self.endpoint, &[("format", "json"), ("url", link)])?;
        let text = get_text(&self.http, url).await?;
        parse_oembed_response(&text)
    }
}

// =============================================================================
// IFRAMELY
// =============================================================================

#[derive(Deserialize)]
struct IframelyResponse {
    #[serde(default)]
    links: IframelyLinks,
    html: Option<String>,
}

#[derive(Deserialize, Default)]
struct IframelyLinks {
    #[serde(default)]
    player: Vec<IframelyLink>,
}

#[derive(Deserialize)]
struct IframelyLink {
    href: Option<String>,
}

/// Parse an Iframely response: first player link, else the `html` snippet.
pub fn parse_iframely_response(text: &str) -> MediaResult<String> {
    let response: IframelyResponse =
        serde_json::from_str(text).map_err(|e| MediaError::Parse(e.to_string()))?;

    if let Some(href) = response
        .links
        .player
        .into_iter()
        .find_map(|link| link.href.filter(|href| !href.is_empty()))
    {
        return Ok(href);
    }
    response
        .html
        .as_deref()
        .and_then(extract_iframe_src)
        .map(str::to_string)
        .ok_or(MediaError::NoPlayer)
}

pub struct IframelyResolver {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl IframelyResolver {
    pub fn new(api_key: impl Into<String>) -> MediaResult<Self> {
        Ok(Self {
            http: build_client()?,
            api_key: api_key.into(),
            endpoint: IFRAMELY_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl EmbedProvider for IframelyResolver {
    async fn resolve(&self, link: &str) -> MediaResult<String> {
        let url = url_with_params(
            &self.endpoint,
            &[("url", link), ("api_key", self.api_key.as_str())],
        )?;
        let text = get_text(&self.http, url).await?;
        parse_iframely_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_iframe_src() {
        let html = r#"<iframe width="100%" height="400" scrolling="no" frameborder="no" src="https://w.soundcloud.com/player/?visual=true&url=x"></iframe>"#;
        assert_eq!(
            extract_iframe_src(html),
            Some("https://w.soundcloud.com/player/?visual=true&url=x")
        );
        assert_eq!(extract_iframe_src("<iframe></iframe>"), None);
        assert_eq!(extract_iframe_src(r#"<iframe src=""></iframe>"#), None);
        assert_eq!(extract_iframe_src(r#"<iframe src="unterminated"#), None);
    }

    #[test]
    fn test_parse_oembed() {
        let body = r#"{"version": 1.0, "type": "rich",
            "html": "<iframe src=\"https://w.soundcloud.com/player/?url=a\"></iframe>"}"#;
        assert_eq!(
            parse_oembed_response(body).unwrap(),
            "https://w.soundcloud.com/player/?url=a"
        );
        assert!(matches!(
            parse_oembed_response(r#"{"type": "rich"}"#),
            Err(MediaError::NoPlayer)
        ));
    }

    #[test]
    fn test_parse_iframely_prefers_player_link() {
        let body = r#"{"links": {"player": [{"href": "https://player.example/1"}]},
            "html": "<iframe src=\"https://other.example\"></iframe>"}"#;
        assert_eq!(parse_iframely_response(body).unwrap(), "https://player.example/1");
    }

    #[test]
    fn test_parse_iframely_falls_back_to_html() {
        let body = r#"{"links": {}, "html": "<iframe src=\"https://other.example\"></iframe>"}"#;
        assert_eq!(parse_iframely_response(body).unwrap(), "https://other.example");
        assert!(matches!(
            parse_iframely_response("{}"),
            Err(MediaError::NoPlayer)
        ));
    }
}
