//! Layered display list produced by the render pipeline.

use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape as _, Size};
use peniko::{BlendMode, Compose, Mix};
use std::fmt;
use studyboard_core::color::Rgba;
use studyboard_core::objects::{ObjectId, TextLine};
use studyboard_core::stroke::point_to_polyline_dist;

/// Flattening tolerance for coverage queries, in layer units.
const FLATTEN_TOLERANCE: f64 = 0.05;

/// Source-over with normal mixing: plain painting.
pub fn normal_blend() -> BlendMode {
    BlendMode::new(Mix::Normal, Compose::SrcOver)
}

/// Multiply onto what is beneath without hiding it.
pub fn highlight_blend() -> BlendMode {
    BlendMode::new(Mix::Multiply, Compose::SrcOver)
}

/// Cut coverage out of what is beneath.
pub fn erase_blend() -> BlendMode {
    BlendMode::new(Mix::Normal, Compose::DestOut)
}

/// Layers in paint order. Each is composited in isolation, so an erase in
/// the ink layer never touches the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Grid,
    Ink,
    Objects,
}

/// Text styling carried by a [`DrawCommand::Text`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub color: Rgba,
    pub bold: bool,
    pub italic: bool,
}

/// A single drawing operation in layer coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill {
        path: BezPath,
        color: Rgba,
        blend: BlendMode,
    },
    /// Round-capped, round-joined stroke.
    Stroke {
        path: BezPath,
        width: f64,
        color: Rgba,
        blend: BlendMode,
    },
    Text {
        lines: Vec<TextLine>,
        style: TextStyle,
    },
    Image {
        id: ObjectId,
        rect: Rect,
        /// Encoded bytes; `None` draws a placeholder.
        data: Option<Vec<u8>>,
    },
}

impl DrawCommand {
    pub fn blend(&self) -> BlendMode {
        match self {
            DrawCommand::Fill { blend, .. } | DrawCommand::Stroke { blend, .. } => *blend,
            DrawCommand::Text { .. } | DrawCommand::Image { .. } => normal_blend(),
        }
    }

    /// Source alpha this command contributes at `point` (layer coordinates).
    ///
    /// Text is not sampled.
    fn source_alpha(&self, point: Point) -> f64 {
        match self {
            DrawCommand::Fill { path, color, .. } => {
                if path.contains(point) {
                    color.alpha()
                } else {
                    0.0
                }
            }
            DrawCommand::Stroke {
                path, width, color, ..
            } => {
                if distance_to_path(point, path) <= width / 2.0 {
                    color.alpha()
                } else {
                    0.0
                }
            }
            DrawCommand::Image { rect, .. } => {
                if rect.contains(point) {
                    1.0
                } else {
                    0.0
                }
            }
            DrawCommand::Text { .. } => 0.0,
        }
    }
}

/// Distance from `point` to the outline of `path`, closing closed subpaths.
fn distance_to_path(point: Point, path: &BezPath) -> f64 {
    let mut best = f64::INFINITY;
    let mut current: Vec<Point> = Vec::new();
    let mut finish = |polyline: &mut Vec<Point>| {
        if !polyline.is_empty() {
            best = best.min(point_to_polyline_dist(point, polyline));
            polyline.clear();
        }
    };
    let mut elements = Vec::new();
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| elements.push(el));
    for el in elements {
        match el {
            PathEl::MoveTo(p) => {
                finish(&mut current);
                current.push(p);
            }
            PathEl::LineTo(p) => current.push(p),
            PathEl::ClosePath => {
                if let Some(first) = current.first().copied() {
                    current.push(first);
                }
                finish(&mut current);
            }
            // Flattening only yields lines.
            PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => current.push(p),
        }
    }
    finish(&mut current);
    best
}

/// One isolated compositing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    /// Layer-to-frame transform.
    pub transform: Affine,
    pub commands: Vec<DrawCommand>,
}

impl Layer {
    pub fn new(kind: LayerKind, transform: Affine) -> Self {
        Self {
            kind,
            transform,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Composited alpha of this layer alone at a frame-space point.
    ///
    /// Commands are evaluated in order with their compose operator:
    /// source-over `a = s + a(1 - s)`, dest-out `a = a(1 - s)`.
    pub fn alpha_at(&self, frame_point: Point) -> f64 {
        let local = self.transform.inverse() * frame_point;
        self.commands.iter().fold(0.0, |alpha, command| {
            let source = command.source_alpha(local);
            if source <= 0.0 {
                return alpha;
            }
            match command.blend().compose {
                Compose::DestOut => alpha * (1.0 - source),
                Compose::Clear => 0.0,
                _ => source + alpha * (1.0 - source),
            }
        })
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame size in device pixels.
    pub size: Size,
    pub background: Rgba,
    /// Grid, ink and objects, back to front.
    pub layers: Vec<Layer>,
}

impl Frame {
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    /// Alpha of one layer at a frame point; zero when the layer is absent.
    pub fn alpha_at(&self, kind: LayerKind, frame_point: Point) -> f64 {
        self.layer(kind)
            .map(|layer| layer.alpha_at(frame_point))
            .unwrap_or(0.0)
    }

    /// Whether anything above the background shows at `frame_point`.
    pub fn is_covered(&self, frame_point: Point) -> bool {
        self.layers.iter().any(|layer| layer.alpha_at(frame_point) > 0.0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.size)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "frame {}x{} background {}",
            self.size.width, self.size.height, self.background
        )?;
        for layer in &self.layers {
            let erases = layer
                .commands
                .iter()
                .filter(|c| c.blend().compose == Compose::DestOut)
                .count();
            writeln!(
                f,
                "  {:?}: {} command(s), {} cut-out(s)",
                layer.kind,
                layer.commands.len(),
                erases
            )?;
        }
        Ok(())
    }
}
