//! Studyboard Media Library
//!
//! HTTP collaborators of the board: site-scoped music search, player embed
//! resolution, the music panel state that ties them together, image
//! fetching for pasted URLs, and the backend client handle.

pub mod backend;
pub mod embed;
pub mod error;
mod http;
pub mod panel;
pub mod search;

pub use backend::{BackendClient, BackendConfig};
pub use embed::{
    DEFAULT_PLAYER_SRC, EmbedProvider, IframelyResolver, SoundCloudOEmbed, extract_iframe_src,
};
pub use error::{MediaError, MediaResult};
pub use http::{ImageFetcher, fetch_image};
pub use panel::{MusicPanel, Ticket};
pub use search::{GoogleSearchClient, SearchConfig, SearchProvider, SearchResult};
