//! Handle to the hosted backend (a PostgREST-style backend-as-a-service).
//!
//! The board does not persist through it yet; the handle only validates its
//! configuration and builds authenticated requests.

use crate::error::{MediaError, MediaResult};
use crate::http::build_client;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: Url,
    pub key: String,
}

impl BackendConfig {
    /// Read `STUDYBOARD_BACKEND_URL` and `STUDYBOARD_BACKEND_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if either is unset or the URL does not parse.
    pub fn from_env() -> MediaResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MediaResult<Self> {
        let required = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| MediaError::MissingConfig { var: var.into() })
        };
        let raw_url = required("STUDYBOARD_BACKEND_URL")?;
        let key = required("STUDYBOARD_BACKEND_KEY")?;
        Self::new(&raw_url, key)
    }

    pub fn new(url: &str, key: impl Into<String>) -> MediaResult<Self> {
        let url = Url::parse(url.trim_end_matches('/')).map_err(|source| MediaError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self {
            url,
            key: key.into(),
        })
    }
}

pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> MediaResult<Self> {
        log::info!("Backend client configured for {}", config.url);
        Ok(Self {
            http: build_client()?,
            config,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// REST endpoint for `table`.
    pub fn rest_url(&self, table: &str) -> MediaResult<Url> {
        let path = format!("rest/v1/{}", table.trim_matches('/'));
        let mut base = self.config.url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(&path).map_err(|source| MediaError::InvalidUrl { url: path, source })
    }

    /// Authenticated GET for `table`.
    pub fn select(&self, table: &str) -> MediaResult<reqwest::RequestBuilder> {
        let url = self.rest_url(table)?;
        Ok(self
            .http
            .get(url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key))
    }
}
