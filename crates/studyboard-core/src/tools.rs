//! Tool controller: the active tool, its input binding and its parameters.

use crate::color::Rgba;
use crate::config::ToolConfig;
use crate::objects::ShapeKind;
use crate::stroke::{PaintMode, Stroke, StrokeCapture, StrokeStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// The active tool. Exactly one value at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tool", content = "shape", rename_all = "lowercase")]
pub enum Tool {
    #[default]
    None,
    Ink,
    Erase,
    Highlight,
    /// Removes whole strokes under the pointer while the button is held.
    #[serde(rename = "erase_stroke")]
    EraseStroke,
    Shape(ShapeKind),
    Text,
}

impl Tool {
    /// Paint mode for drawing tools.
    pub fn paint_mode(self) -> Option<PaintMode> {
        match self {
            Tool::Ink => Some(PaintMode::Ink),
            Tool::Erase => Some(PaintMode::Erase),
            Tool::Highlight => Some(PaintMode::Highlight),
            Tool::None | Tool::EraseStroke | Tool::Shape(_) | Tool::Text => None,
        }
    }

    /// Object created by a placement tool's click.
    pub fn placement(self) -> Option<Placement> {
        match self {
            Tool::Shape(kind) => Some(Placement::Shape(kind)),
            Tool::Text => Some(Placement::Text),
            Tool::None | Tool::Ink | Tool::Erase | Tool::Highlight | Tool::EraseStroke => None,
        }
    }
}

/// What an armed placement tool creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Text,
    Shape(ShapeKind),
}

/// Input owned by the active tool. Replaced wholesale whenever the tool
/// changes, so it can never outlive the tool that acquired it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Binding {
    #[default]
    Released,
    /// A drawing tool waiting for pointer-down.
    Ready(PaintMode),
    /// A stroke is being captured.
    Drawing(StrokeCapture),
    /// The stroke eraser is waiting for pointer-down.
    SweepReady,
    /// The stroke eraser is held down.
    Sweeping,
    /// The next canvas click places an object.
    Armed(Placement),
}

/// Tool selection plus stroke parameters.
#[derive(Debug, Clone)]
pub struct ToolController {
    tool: Tool,
    binding: Binding,
    color: Rgba,
    width: f64,
    highlight_opacity: f64,
    config: ToolConfig,
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}

impl ToolController {
    /// Create a controller. An invalid config is replaced by the defaults.
    pub fn new(config: ToolConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("Ignoring tool config: {err}");
                ToolConfig::default()
            }
        };
        Self {
            tool: Tool::None,
            binding: Binding::Released,
            color: config.color,
            width: config.width.clamp(config.min_width, config.max_width),
            highlight_opacity: config
                .highlight_opacity
                .clamp(config.min_highlight_opacity, config.max_highlight_opacity),
            config,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn highlight_opacity(&self) -> f64 {
        self.highlight_opacity
    }

    /// Activate `tool`, releasing the previous binding first.
    ///
    /// A stroke in progress is finalized with the usual two-point rule and
    /// returned so the caller can commit it.
    pub fn select(&mut self, tool: Tool) -> Option<Stroke> {
        let finished = self.release();
        if tool != self.tool {
            log::debug!("Tool switched: {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
        self.binding = if let Some(mode) = tool.paint_mode() {
            Binding::Ready(mode)
        } else if tool == Tool::EraseStroke {
            Binding::SweepReady
        } else if let Some(placement) = tool.placement() {
            Binding::Armed(placement)
        } else {
            Binding::Released
        };
        finished
    }

    /// Toolbar behaviour: activating the active tool turns it off.
    pub fn toggle(&mut self, tool: Tool) -> Option<Stroke> {
        if self.tool == tool {
            self.select(Tool::None)
        } else {
            self.select(tool)
        }
    }

    fn release(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.binding) {
            Binding::Drawing(capture) => capture.finish(),
            Binding::Released
            | Binding::Ready(_)
            | Binding::Armed(_)
            | Binding::SweepReady
            | Binding::Sweeping => None,
        }
    }

    /// Start capturing at a canvas-local point. Returns `false` when the
    /// active tool does not draw.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        let mode = match &self.binding {
            Binding::Ready(mode) => *mode,
            // A missed pointer-up; start over rather than joining strokes.
            Binding::Drawing(capture) => capture.mode(),
            Binding::Released | Binding::Armed(_) | Binding::SweepReady | Binding::Sweeping => {
                return false;
            }
        };
        let mut capture = StrokeCapture::new(mode, self.style_for(mode));
        capture.push(point);
        self.binding = Binding::Drawing(capture);
        true
    }

    /// Append a point to the stroke in progress.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match &mut self.binding {
            Binding::Drawing(capture) => {
                capture.push(point);
                true
            }
            _ => false,
        }
    }

    /// Finish the stroke in progress and return to waiting for pointer-down.
    pub fn end_stroke(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.binding) {
            Binding::Drawing(capture) => {
                self.binding = Binding::Ready(capture.mode());
                capture.finish()
            }
            other => {
                self.binding = other;
                None
            }
        }
    }

    /// Hold the stroke eraser down. Returns `false` when it is not active.
    pub fn begin_sweep(&mut self) -> bool {
        match self.binding {
            Binding::SweepReady | Binding::Sweeping => {
                self.binding = Binding::Sweeping;
                true
            }
            _ => false,
        }
    }

    pub fn is_sweeping(&self) -> bool {
        self.binding == Binding::Sweeping
    }

    /// Lift the stroke eraser. Returns whether it was held.
    pub fn end_sweep(&mut self) -> bool {
        if self.is_sweeping() {
            self.binding = Binding::SweepReady;
            true
        } else {
            false
        }
    }

    pub fn in_progress(&self) -> Option<&StrokeCapture> {
        match &self.binding {
            Binding::Drawing(capture) => Some(capture),
            _ => None,
        }
    }

    pub fn armed(&self) -> Option<Placement> {
        match self.binding {
            Binding::Armed(placement) => Some(placement),
            _ => None,
        }
    }

    /// Consume the armed placement. The tool returns to `None`.
    pub fn take_placement(&mut self) -> Option<Placement> {
        let placement = self.armed()?;
        self.select(Tool::None);
        Some(placement)
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    /// Set the stroke width, saturating at the configured bounds.
    pub fn set_width(&mut self, width: f64) {
        if width.is_finite() {
            self.width = width.clamp(self.config.min_width, self.config.max_width);
        }
    }

    pub fn increase_width(&mut self) {
        self.set_width(self.width + self.config.width_step);
    }

    pub fn decrease_width(&mut self) {
        self.set_width(self.width - self.config.width_step);
    }

    /// Set the highlighter opacity, saturating at the configured bounds.
    pub fn set_highlight_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.highlight_opacity = opacity.clamp(
                self.config.min_highlight_opacity,
                self.config.max_highlight_opacity,
            );
        }
    }

    /// Style snapshot for a new stroke in `mode`.
    pub fn style_for(&self, mode: PaintMode) -> StrokeStyle {
        match mode {
            PaintMode::Ink => StrokeStyle {
                color: self.color,
                width: self.width,
                opacity: 1.0,
            },
            PaintMode::Highlight => StrokeStyle {
                color: self.color,
                width: self.width * self.config.highlight_width_factor,
                opacity: self.highlight_opacity,
            },
            PaintMode::Erase => StrokeStyle {
                color: self.color,
                width: self.width * self.config.erase_width_factor,
                opacity: 1.0,
            },
        }
    }
}
