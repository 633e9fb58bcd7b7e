//! Placed objects: text boxes, labelled shapes and images above the ink.

pub mod image;
pub mod label;
pub mod shape;
pub mod text_box;

pub use self::image::{ImageError, ImageObject, decode_dimensions};
pub use label::{Label, TextAlign, TextLine};
pub use shape::LabeledShape;
pub use text_box::TextBox;

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for placed objects.
pub type ObjectId = Uuid;

/// Outline of a placeable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Square,
    Circle,
    Triangle,
    Pentagon,
    Hexagon,
}

/// An independently selectable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlacedObject {
    Text(TextBox),
    Shape(LabeledShape),
    Image(ImageObject),
}

impl PlacedObject {
    pub fn id(&self) -> ObjectId {
        match self {
            PlacedObject::Text(t) => t.id(),
            PlacedObject::Shape(s) => s.id(),
            PlacedObject::Image(i) => i.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            PlacedObject::Text(t) => t.bounds(),
            PlacedObject::Shape(s) => s.bounds(),
            PlacedObject::Image(i) => i.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            PlacedObject::Text(t) => t.bounds().inflate(tolerance, tolerance).contains(point),
            PlacedObject::Shape(s) => s.hit_test(point, tolerance),
            PlacedObject::Image(i) => i.bounds().inflate(tolerance, tolerance).contains(point),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            PlacedObject::Text(t) => t.translate(delta),
            PlacedObject::Shape(s) => s.translate(delta),
            PlacedObject::Image(i) => i.translate(delta),
        }
    }

    /// Scale about the centre. Label fonts saturate at `[min_font, max_font]`.
    pub fn resize(&mut self, factor: f64, min_font: f64, max_font: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        match self {
            PlacedObject::Text(t) => t.resize(factor, min_font, max_font),
            PlacedObject::Shape(s) => s.resize(factor, min_font, max_font),
            PlacedObject::Image(i) => i.resize(factor),
        }
    }

    /// The editable label, if this object has one.
    pub fn label(&self) -> Option<&Label> {
        match self {
            PlacedObject::Text(t) => Some(&t.label),
            PlacedObject::Shape(s) => Some(&s.label),
            PlacedObject::Image(_) => None,
        }
    }

    pub fn label_mut(&mut self) -> Option<&mut Label> {
        match self {
            PlacedObject::Text(t) => Some(&mut t.label),
            PlacedObject::Shape(s) => Some(&mut s.label),
            PlacedObject::Image(_) => None,
        }
    }

    /// Where the label is laid out and whether it is vertically centred.
    pub fn label_frame(&self) -> Option<(Rect, bool)> {
        match self {
            PlacedObject::Text(t) => Some((t.bounds(), false)),
            PlacedObject::Shape(s) => Some((s.label_rect(), true)),
            PlacedObject::Image(_) => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut LabeledShape> {
        match self {
            PlacedObject::Shape(s) => Some(s),
            _ => None,
        }
    }
}
