//! Thin GET helpers over a shared `reqwest::Client`.

use crate::error::{MediaError, MediaResult};
use url::Url;

pub(crate) fn build_client() -> MediaResult<reqwest::Client> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| MediaError::HttpClientBuild(e.to_string()))
}

/// Parse `base` and append query parameters.
pub(crate) fn url_with_params(base: &str, params: &[(&str, &str)]) -> MediaResult<Url> {
    Url::parse_with_params(base, params).map_err(|source| MediaError::InvalidUrl {
        url: base.to_string(),
        source,
    })
}

async fn get(http: &reqwest::Client, url: Url) -> MediaResult<reqwest::Response> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MediaError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

pub(crate) async fn get_text(http: &reqwest::Client, url: Url) -> MediaResult<String> {
    get(http, url)
        .await?
        .text()
        .await
        .map_err(|e| MediaError::Request(e.to_string()))
}

/// Download an image (or any resource) and return its raw bytes.
pub async fn fetch_image(http: &reqwest::Client, url: &Url) -> MediaResult<Vec<u8>> {
    let bytes = get(http, url.clone())
        .await?
        .bytes()
        .await
        .map_err(|e| MediaError::Request(e.to_string()))?;
    log::debug!("Fetched {} byte(s) from {url}", bytes.len());
    Ok(bytes.to_vec())
}

/// Image fetcher owning its HTTP client.
pub struct ImageFetcher {
    http: reqwest::Client,
}

impl ImageFetcher {
    pub fn new() -> MediaResult<Self> {
        Ok(Self {
            http: build_client()?,
        })
    }

    pub async fn fetch(&self, url: &Url) -> MediaResult<Vec<u8>> {
        fetch_image(&self.http, url).await
    }
}
