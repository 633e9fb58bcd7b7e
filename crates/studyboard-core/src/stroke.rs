//! Stroke model: immutable committed strokes, the in-progress capture and
//! the undoable history.

use crate::color::Rgba;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// How a stroke composites onto the ink layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintMode {
    /// Opaque ink.
    Ink,
    /// Removes coverage from ink drawn earlier.
    Erase,
    /// Translucent color that never hides what is beneath.
    Highlight,
}

/// Style snapshot taken when a stroke starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f64,
    /// 1.0 for ink and erase, the highlighter opacity otherwise.
    pub opacity: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: 5.0,
            opacity: 1.0,
        }
    }
}

/// A committed stroke. Always holds at least two finite points; the
/// deserializer enforces the same rule as [`StrokeCapture::finish`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeData")]
pub struct Stroke {
    mode: PaintMode,
    style: StrokeStyle,
    points: Vec<Point>,
}

/// Stroke fields as they appear on the wire, before validation.
#[derive(Deserialize)]
struct StrokeData {
    mode: PaintMode,
    style: StrokeStyle,
    points: Vec<Point>,
}

/// A stored stroke that could never have been committed.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidStroke {
    #[error("stroke needs at least two points, got {0}")]
    TooFewPoints(usize),
    #[error("stroke point {0} is not finite")]
    NonFinitePoint(usize),
}

impl TryFrom<StrokeData> for Stroke {
    type Error = InvalidStroke;

    fn try_from(data: StrokeData) -> Result<Self, Self::Error> {
        if data.points.len() < 2 {
            return Err(InvalidStroke::TooFewPoints(data.points.len()));
        }
        if let Some(index) = data.points.iter().position(|p| !p.is_finite()) {
            return Err(InvalidStroke::NonFinitePoint(index));
        }
        Ok(Stroke {
            mode: data.mode,
            style: data.style,
            points: data.points,
        })
    }
}

impl Stroke {
    pub fn mode(&self) -> PaintMode {
        self.mode
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Bounding box of the points, grown by half the stroke width.
    pub fn bounds(&self) -> Rect {
        polyline_bounds(&self.points).inflate(self.style.width / 2.0, self.style.width / 2.0)
    }

    /// Whether `point` lies within `tolerance` of the stroked outline.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.style.width / 2.0
    }

    /// Centre-line path through the points.
    pub fn to_path(&self) -> BezPath {
        polyline_path(&self.points)
    }
}

/// Points accumulated between pointer-down and commit.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeCapture {
    mode: PaintMode,
    style: StrokeStyle,
    points: Vec<Point>,
}

impl StrokeCapture {
    /// Start a capture with the style fixed for its lifetime.
    pub fn new(mode: PaintMode, style: StrokeStyle) -> Self {
        Self {
            mode,
            style,
            points: Vec::new(),
        }
    }

    /// Append a canvas-local point. Non-finite points are dropped.
    pub fn push(&mut self, point: Point) {
        if point.is_finite() {
            self.points.push(point);
        }
    }

    pub fn mode(&self) -> PaintMode {
        self.mode
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finalize the capture. Fewer than two points yields `None`.
    pub fn finish(self) -> Option<Stroke> {
        if self.points.len() < 2 {
            log::debug!(
                "Discarding {:?} stroke with {} point(s)",
                self.mode,
                self.points.len()
            );
            return None;
        }
        log::debug!("Committing {:?} stroke with {} points", self.mode, self.points.len());
        Some(Stroke {
            mode: self.mode,
            style: self.style,
            points: self.points,
        })
    }
}

/// One undoable step.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Draw(Stroke),
    /// Hides the strokes drawn by the entries at these positions.
    Erase(Vec<usize>),
}

/// Append-only list of history entries with a cursor for undo/redo.
///
/// Entries are never mutated once pushed. Undo moves the cursor back, and a
/// new entry pushed after an undo drops the hidden tail. Erasing a stroke is
/// itself an entry, so undoing it brings the stroke back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl StrokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        self.cursor = self.entries.len();
    }

    pub fn commit(&mut self, stroke: Stroke) {
        self.push(HistoryEntry::Draw(stroke));
    }

    /// Entries up to the cursor, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries[..self.cursor]
    }

    fn erased(&self) -> HashSet<usize> {
        self.entries()
            .iter()
            .filter_map(|entry| match entry {
                HistoryEntry::Erase(indices) => Some(indices),
                HistoryEntry::Draw(_) => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    fn live(&self) -> impl Iterator<Item = (usize, &Stroke)> {
        let erased = self.erased();
        self.entries()
            .iter()
            .enumerate()
            .filter_map(move |(index, entry)| match entry {
                HistoryEntry::Draw(stroke) if !erased.contains(&index) => Some((index, stroke)),
                _ => None,
            })
    }

    /// Strokes currently shown, oldest first.
    pub fn visible(&self) -> Vec<&Stroke> {
        self.live().map(|(_, stroke)| stroke).collect()
    }

    /// Hide every visible ink or highlight stroke within `tolerance` of
    /// `point`, as a single entry. Eraser strokes are never picked.
    ///
    /// Returns `true` if anything was hidden.
    pub fn erase_at(&mut self, point: Point, tolerance: f64) -> bool {
        let hits: Vec<usize> = self
            .live()
            .filter(|(_, stroke)| stroke.mode() != PaintMode::Erase)
            .filter(|(_, stroke)| stroke.hit_test(point, tolerance))
            .map(|(index, _)| index)
            .collect();
        if hits.is_empty() {
            return false;
        }
        log::debug!("Erasing {} stroke(s) at ({:.1}, {:.1})", hits.len(), point.x, point.y);
        self.push(HistoryEntry::Erase(hits));
        true
    }

    /// Number of visible strokes.
    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn undo(&mut self) -> bool {
        if self.can_undo() {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.can_redo() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }
}

/// Bounding box of a point list; `Rect::ZERO` when empty.
pub fn polyline_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
}

/// Open path through the points.
pub fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
    }
    path
}

/// Distance from `point` to the segment `a`-`b`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let line_vec = b - a;
    let point_vec: Vec2 = point - a;
    let len_sq = line_vec.hypot2();
    if len_sq < f64::EPSILON {
        return point_vec.hypot();
    }
    let t = (point_vec.dot(line_vec) / len_sq).clamp(0.0, 1.0);
    (point - (a + line_vec * t)).hypot()
}

/// Distance from `point` to the nearest segment of a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
