//! Free-standing text box.

use super::ObjectId;
use super::label::Label;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text box anchored at its top-left corner with a fixed wrap width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub(crate) id: ObjectId,
    pub position: Point,
    pub width: f64,
    pub label: Label,
}

impl TextBox {
    /// Create a text box centred on `center`.
    pub fn new(center: Point, width: f64, label: Label) -> Self {
        let height = label.measure().height.max(label.line_height());
        Self {
            id: Uuid::new_v4(),
            position: Point::new(center.x - width / 2.0, center.y - height / 2.0),
            width,
            label,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        let size = self.label.measure();
        let width = self.width.max(size.width);
        let height = size.height.max(self.label.line_height());
        Rect::from_origin_size(self.position, (width, height))
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Scale about the centre, including the font size.
    pub fn resize(&mut self, factor: f64, min_font: f64, max_font: f64) {
        let center = self.bounds().center();
        self.width *= factor;
        self.label
            .set_font_size(self.label.font_size * factor, min_font, max_font);
        let bounds = self.bounds();
        self.position = Point::new(
            center.x - bounds.width() / 2.0,
            center.y - bounds.height() / 2.0,
        );
    }
}
