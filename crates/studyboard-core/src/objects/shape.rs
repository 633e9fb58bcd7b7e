//! Polygon and circle shapes carrying an owned label.

use super::label::Label;
use super::{ObjectId, ShapeKind};
use crate::color::Rgba;
use crate::stroke::point_to_polyline_dist;
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as _, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use uuid::Uuid;

/// A shape with a label. Geometry and label move, scale and delete as one
/// unit; the label is laid out relative to the shape's box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledShape {
    pub(crate) id: ObjectId,
    pub kind: ShapeKind,
    pub center: Point,
    pub size: Size,
    pub border_width: f64,
    pub fill: Rgba,
    pub border: Rgba,
    pub label: Label,
}

impl LabeledShape {
    pub fn new(kind: ShapeKind, center: Point, size: Size, label: Label) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            center,
            size,
            border_width: 1.0,
            fill: Rgba::rgb(0xf0, 0xc0, 0x40),
            border: Rgba::BLACK,
            label,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    /// Corner points for polygon kinds; empty for circles.
    ///
    /// Vertices lie on the ellipse inscribed in the box, first vertex at the
    /// top, except squares which fill the box.
    pub fn vertices(&self) -> Vec<Point> {
        let rect = self.bounds();
        let sides = match self.kind {
            ShapeKind::Square => {
                return vec![
                    Point::new(rect.x0, rect.y0),
                    Point::new(rect.x1, rect.y0),
                    Point::new(rect.x1, rect.y1),
                    Point::new(rect.x0, rect.y1),
                ];
            }
            ShapeKind::Circle => return Vec::new(),
            ShapeKind::Triangle => 3,
            ShapeKind::Pentagon => 5,
            ShapeKind::Hexagon => 6,
        };
        let (rx, ry) = (self.size.width / 2.0, self.size.height / 2.0);
        (0..sides)
            .map(|i| {
                let angle = -FRAC_PI_2 + TAU * i as f64 / sides as f64;
                Point::new(self.center.x + rx * angle.cos(), self.center.y + ry * angle.sin())
            })
            .collect()
    }

    /// Closed outline path.
    pub fn outline(&self) -> BezPath {
        if self.kind == ShapeKind::Circle {
            return self.ellipse().to_path(0.1);
        }
        let mut path = BezPath::new();
        let vertices = self.vertices();
        if let Some((first, rest)) = vertices.split_first() {
            path.move_to(*first);
            for v in rest {
                path.line_to(*v);
            }
            path.close_path();
        }
        path
    }

    fn ellipse(&self) -> Ellipse {
        Ellipse::from_rect(self.bounds())
    }

    /// Inside the outline, or within `tolerance` of the border.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.border_width / 2.0;
        if self.kind == ShapeKind::Circle {
            let rx = self.size.width / 2.0 + reach;
            let ry = self.size.height / 2.0 + reach;
            if rx <= 0.0 || ry <= 0.0 {
                return false;
            }
            let dx = (point.x - self.center.x) / rx;
            let dy = (point.y - self.center.y) / ry;
            return dx * dx + dy * dy <= 1.0;
        }
        if self.outline().contains(point) {
            return true;
        }
        let mut ring = self.vertices();
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        point_to_polyline_dist(point, &ring) <= reach
    }

    /// Box the label is laid out in.
    pub fn label_rect(&self) -> Rect {
        self.bounds().inset(-4.0)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    /// Scale about the centre; the label font scales with it.
    pub fn resize(&mut self, factor: f64, min_font: f64, max_font: f64) {
        self.size = Size::new(self.size.width * factor, self.size.height * factor);
        self.label
            .set_font_size(self.label.font_size * factor, min_font, max_font);
    }

    pub fn set_border_width(&mut self, width: f64) {
        if width.is_finite() {
            self.border_width = width.max(0.0);
        }
    }
}
