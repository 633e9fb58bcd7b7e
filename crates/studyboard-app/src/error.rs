use std::io;
use std::path::PathBuf;
use studyboard_core::{ConfigError, TimerError};
use studyboard_media::MediaError;
use studyboard_render::RendererError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid event script {path}: {source}")]
    Events {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown grid style '{0}' (expected none, lines or dots)")]
    GridStyle(String),

    #[error("failed to serialize board: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RendererError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Timer(#[from] TimerError),
}
