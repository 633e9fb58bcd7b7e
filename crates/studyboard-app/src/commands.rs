//! Subcommand implementations.

use crate::error::CliError;
use std::path::Path;
use std::time::Duration;
use studyboard_core::{BoardEvent, Effect, PomodoroTimer, Whiteboard};
use studyboard_media::{
    EmbedProvider, GoogleSearchClient, IframelyResolver, ImageFetcher, MediaError, MusicPanel,
    SearchConfig, SoundCloudOEmbed,
};
use studyboard_render::{GridStyle, RecordingRenderer, RenderContext, Renderer};
use url::Url;

/// Read a JSON array of board events.
pub fn load_events(path: &Path) -> Result<Vec<BoardEvent>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Events {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `events` in order. Image loads are fetched when a fetcher is given
/// and skipped otherwise. Returns the number of events that asked for a
/// redraw.
pub async fn replay(
    board: &mut Whiteboard,
    events: Vec<BoardEvent>,
    fetcher: Option<&ImageFetcher>,
) -> usize {
    let mut redraws = 0;
    for event in events {
        let response = board.handle(event);
        if response.redraw {
            redraws += 1;
        }
        let Some(Effect::LoadImage { url }) = response.effect else {
            continue;
        };
        let Some(fetcher) = fetcher else {
            log::info!("Skipping image {url} (fetching disabled)");
            continue;
        };
        let data = match Url::parse(&url) {
            Ok(parsed) => fetcher.fetch(&parsed).await,
            Err(err) => {
                log::warn!("Pasted image URL {url} is invalid: {err}");
                continue;
            }
        };
        match data {
            Ok(data) => {
                if board.handle(BoardEvent::ImageLoaded { url, data }).redraw {
                    redraws += 1;
                }
            }
            Err(err) => log::warn!("Failed to fetch {url}: {err}"),
        }
    }
    redraws
}

/// Render the board once and describe the resulting frame.
pub fn frame_report(board: &Whiteboard, grid: GridStyle) -> Result<String, CliError> {
    let mut renderer = RecordingRenderer::new();
    renderer.build_scene(&RenderContext::new(board).with_grid(grid))?;
    Ok(renderer
        .last_frame()
        .map(ToString::to_string)
        .unwrap_or_default())
}

pub fn parse_grid(name: &str) -> Result<GridStyle, CliError> {
    GridStyle::from_name(name).ok_or_else(|| CliError::GridStyle(name.to_string()))
}

/// Search, print the results and optionally resolve the `choose`-th (1-based).
pub async fn search(
    query: &str,
    choose: Option<usize>,
    iframely_key: Option<String>,
) -> Result<(), CliError> {
    let client = GoogleSearchClient::new(SearchConfig::from_env()?)?;
    let mut panel = MusicPanel::new();
    panel.set_query(query);
    panel.search(&client).await;

    if panel.results().is_empty() {
        println!("No results for '{query}'");
    }
    for (n, result) in panel.results().iter().enumerate() {
        println!("{:>2}. {}", n + 1, result.title);
        println!("    {}", result.link);
        if let Some(thumbnail) = &result.thumbnail {
            println!("    cover: {thumbnail}");
        }
    }

    if let Some(choice) = choose {
        let index = choice.checked_sub(1).ok_or(MediaError::NoSuchResult(0))?;
        let provider: Box<dyn EmbedProvider> = match iframely_key {
            Some(key) => Box::new(IframelyResolver::new(key)?),
            None => Box::new(SoundCloudOEmbed::new()?),
        };
        panel.play(index, provider.as_ref()).await?;
    }
    println!("player: {}", panel.player_src());
    Ok(())
}

/// Run a timer for `elapsed_secs` and return what it shows.
pub fn timer(duration: &str, elapsed_secs: u64) -> Result<String, CliError> {
    let mut timer = PomodoroTimer::default();
    timer.set(duration)?;
    timer.start();
    timer.tick(Duration::from_secs(elapsed_secs));
    Ok(timer.display())
}
