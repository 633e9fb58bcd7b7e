//! Music search panel state.
//!
//! Searches and embed lookups are issued with a [`Ticket`]. Only a response
//! carrying the most recently issued ticket of its kind is applied; older
//! responses are dropped, so a slow reply can never overwrite newer state.

use crate::embed::{DEFAULT_PLAYER_SRC, EmbedProvider};
use crate::error::{MediaError, MediaResult};
use crate::search::{SearchProvider, SearchResult};

/// Request generation handed out when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicPanel {
    query: String,
    results: Vec<SearchResult>,
    player_src: String,
    search_generation: u64,
    embed_generation: u64,
}

impl Default for MusicPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicPanel {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            player_src: DEFAULT_PLAYER_SRC.to_string(),
            search_generation: 0,
            embed_generation: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// URL the player iframe should show.
    pub fn player_src(&self) -> &str {
        &self.player_src
    }

    /// Issue a search for the current query.
    pub fn begin_search(&mut self) -> Ticket {
        self.search_generation += 1;
        Ticket(self.search_generation)
    }

    /// Apply a search response. Returns whether it was applied.
    pub fn finish_search(
        &mut self,
        ticket: Ticket,
        response: MediaResult<Vec<SearchResult>>,
    ) -> bool {
        if ticket.0 != self.search_generation {
            log::debug!(
                "Dropping stale search response {:?} (latest {})",
                ticket,
                self.search_generation
            );
            return false;
        }
        match response {
            Ok(results) => {
                log::debug!("Search '{}' returned {} result(s)", self.query, results.len());
                self.results = results;
                true
            }
            Err(err) => {
                log::warn!("Search '{}' failed: {err}", self.query);
                false
            }
        }
    }

    /// Pick a result; returns the ticket and the link to resolve.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::NoSuchResult`] if `index` is out of range.
    pub fn choose(&mut self, index: usize) -> MediaResult<(Ticket, String)> {
        let link = self
            .results
            .get(index)
            .map(|result| result.link.clone())
            .ok_or(MediaError::NoSuchResult(index))?;
        self.embed_generation += 1;
        Ok((Ticket(self.embed_generation), link))
    }

    /// Apply an embed response. Returns whether the player source changed.
    ///
    /// A response without a player resets to the default player.
    pub fn finish_embed(&mut self, ticket: Ticket, response: MediaResult<String>) -> bool {
        if ticket.0 != self.embed_generation {
            log::debug!(
                "Dropping stale embed response {:?} (latest {})",
                ticket,
                self.embed_generation
            );
            return false;
        }
        let src = match response {
            Ok(src) => src,
            Err(MediaError::NoPlayer) => {
                log::warn!("Chosen track has no embeddable player");
                DEFAULT_PLAYER_SRC.to_string()
            }
            Err(err) => {
                log::warn!("Embed lookup failed: {err}");
                return false;
            }
        };
        let changed = src != self.player_src;
        self.player_src = src;
        changed
    }

    /// Run a search for the current query to completion.
    pub async fn search(&mut self, provider: &dyn SearchProvider) -> bool {
        let ticket = self.begin_search();
        let response = provider.search(&self.query).await;
        self.finish_search(ticket, response)
    }

    /// Choose a result and resolve its player to completion.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::NoSuchResult`] if `index` is out of range.
    pub async fn play(&mut self, index: usize, provider: &dyn EmbedProvider) -> MediaResult<bool> {
        let (ticket, link) = self.choose(index)?;
        let response = provider.resolve(&link).await;
        Ok(self.finish_embed(ticket, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeSearch;

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, query: &str) -> MediaResult<Vec<SearchResult>> {
            Ok((1..=3)
                .map(|n| SearchResult {
                    title: format!("{query} {n}"),
                    link: format!("https://soundcloud.com/artist/{query}-{n}"),
                    thumbnail: None,
                })
                .collect())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str) -> MediaResult<Vec<SearchResult>> {
            Err(MediaError::Request("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct FakeEmbed {
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmbedProvider for FakeEmbed {
        async fn resolve(&self, link: &str) -> MediaResult<String> {
            self.requests.lock().unwrap().push(link.to_string());
            Ok(format!("https://w.soundcloud.com/player/?url={link}"))
        }
    }

    fn result(n: usize) -> SearchResult {
        SearchResult {
            title: format!("track {n}"),
            link: format!("https://soundcloud.com/a/track-{n}"),
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn test_search_then_choose_second_result() {
        let mut panel = MusicPanel::new();
        assert_eq!(panel.player_src(), DEFAULT_PLAYER_SRC);

        panel.set_query("lofi");
        assert!(panel.search(&FakeSearch).await);
        assert_eq!(panel.results().len(), 3);

        let embed = FakeEmbed::default();
        assert!(panel.play(1, &embed).await.unwrap());

        let requests = embed.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            ["https://soundcloud.com/artist/lofi-2".to_string()]
        );
        assert_eq!(
            panel.player_src(),
            "https://w.soundcloud.com/player/?url=https://soundcloud.com/artist/lofi-2"
        );
    }

    #[tokio::test]
    async fn test_failed_search_keeps_results() {
        let mut panel = MusicPanel::new();
        panel.set_query("lofi");
        panel.search(&FakeSearch).await;
        assert!(!panel.search(&FailingSearch).await);
        assert_eq!(panel.results().len(), 3);
    }

    #[tokio::test]
    async fn test_choose_out_of_range() {
        let mut panel = MusicPanel::new();
        let embed = FakeEmbed::default();
        let err = panel.play(0, &embed).await.unwrap_err();
        assert!(matches!(err, MediaError::NoSuchResult(0)));
        assert!(embed.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_stale_search_response_dropped() {
        let mut panel = MusicPanel::new();
        let first = panel.begin_search();
        let second = panel.begin_search();

        assert!(panel.finish_search(second, Ok(vec![result(2)])));
        assert!(!panel.finish_search(first, Ok(vec![result(1), result(1)])));
        assert_eq!(panel.results(), &[result(2)]);
    }

    #[test]
    fn test_stale_embed_response_dropped() {
        let mut panel = MusicPanel::new();
        let ticket = panel.begin_search();
        panel.finish_search(ticket, Ok(vec![result(1), result(2)]));

        let (first, _) = panel.choose(0).unwrap();
        let (second, _) = panel.choose(1).unwrap();
        assert!(panel.finish_embed(second, Ok("https://player/2".into())));
        assert!(!panel.finish_embed(first, Ok("https://player/1".into())));
        assert_eq!(panel.player_src(), "https://player/2");
    }

    #[test]
    fn test_missing_player_resets_to_default() {
        let mut panel = MusicPanel::new();
        let ticket = panel.begin_search();
        panel.finish_search(ticket, Ok(vec![result(1)]));

        let (ticket, _) = panel.choose(0).unwrap();
        panel.finish_embed(ticket, Ok("https://player/1".into()));
        let (ticket, _) = panel.choose(0).unwrap();
        assert!(panel.finish_embed(ticket, Err(MediaError::NoPlayer)));
        assert_eq!(panel.player_src(), DEFAULT_PLAYER_SRC);

        let (ticket, _) = panel.choose(0).unwrap();
        assert!(!panel.finish_embed(ticket, Err(MediaError::Request("timeout".into()))));
        assert_eq!(panel.player_src(), DEFAULT_PLAYER_SRC);
    }
}
