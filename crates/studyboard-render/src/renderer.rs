//! Renderer trait abstraction.

use crate::frame::Frame;
use studyboard_core::Whiteboard;
use studyboard_core::color::Rgba;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid frame size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid (plain background).
    None,
    /// Full grid lines.
    Lines,
    /// Dots at grid intersections.
    #[default]
    Dots,
}

impl GridStyle {
    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "none",
            GridStyle::Lines => "lines",
            GridStyle::Dots => "dots",
        }
    }

    /// Parse a style name as printed by [`GridStyle::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(GridStyle::None),
            "lines" => Some(GridStyle::Lines),
            "dots" => Some(GridStyle::Dots),
            _ => None,
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub board: &'a Whiteboard,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub background_color: Rgba,
    pub grid_style: GridStyle,
    pub grid_color: Rgba,
    /// Selection outline and handle color.
    pub selection_color: Rgba,
}

impl<'a> RenderContext<'a> {
    /// Create a context using the board's configured colors.
    pub fn new(board: &'a Whiteboard) -> Self {
        let grid = &board.config().grid;
        Self {
            board,
            scale_factor: 1.0,
            background_color: grid.background,
            grid_style: GridStyle::default(),
            grid_color: grid.color,
            selection_color: Rgba::rgb(59, 130, 246),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }
}

/// Trait for rendering backends.
///
/// Backends only see finished [`Frame`]s; building the frame is shared.
pub trait Renderer {
    /// Encode a frame.
    fn render_frame(&mut self, frame: &Frame) -> RenderResult<()>;

    /// Build the frame for `ctx` and encode it.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let frame = Frame::build(ctx);
        self.render_frame(&frame)
    }
}

/// Reject frames a backend cannot allocate a target for.
pub(crate) fn check_size(frame: &Frame) -> RenderResult<()> {
    let (width, height) = (frame.size.width, frame.size.height);
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(RendererError::InvalidSize { width, height })
    }
}

/// Headless renderer that keeps the last frame.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    last_frame: Option<Frame>,
    frames_rendered: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }
}

impl Renderer for RecordingRenderer {
    fn render_frame(&mut self, frame: &Frame) -> RenderResult<()> {
        check_size(frame)?;
        self.last_frame = Some(frame.clone());
        self.frames_rendered += 1;
        Ok(())
    }
}
