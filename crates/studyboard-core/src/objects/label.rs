//! Text labels shared by text boxes and shapes.

use crate::color::Rgba;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Average glyph advance as a fraction of the font size. Used for layout
/// without a font engine; the GPU renderer lays text out properly.
const CHAR_WIDTH_FACTOR: f64 = 0.6;
/// Line height as a multiple of font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Top-left corner of the line box.
    pub origin: Point,
    pub width: f64,
}

/// Editable rich-ish text: content plus font styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub content: String,
    pub font_size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub align: TextAlign,
    pub color: Rgba,
}

impl Label {
    pub fn new(content: impl Into<String>, font_size: f64, color: Rgba) -> Self {
        Self {
            content: content.into(),
            font_size,
            bold: false,
            italic: false,
            underline: false,
            align: TextAlign::default(),
            color,
        }
    }

    /// Set the font size, saturating at `[min, max]`.
    pub fn set_font_size(&mut self, size: f64, min: f64, max: f64) {
        if size.is_finite() {
            self.font_size = size.clamp(min, max);
        }
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT
    }

    fn line_width(&self, line: &str) -> f64 {
        line.chars().count() as f64 * self.font_size * CHAR_WIDTH_FACTOR
    }

    /// Approximate size of the laid-out text.
    pub fn measure(&self) -> Size {
        let lines: Vec<&str> = self.content.split('\n').collect();
        let width = lines
            .iter()
            .map(|line| self.line_width(line))
            .fold(0.0, f64::max);
        Size::new(width, lines.len() as f64 * self.line_height())
    }

    /// Lay the lines out inside `rect`, honouring the alignment.
    ///
    /// With `center_vertically` the block is centred in `rect`; otherwise it
    /// starts at the top edge.
    pub fn layout(&self, rect: Rect, center_vertically: bool) -> Vec<TextLine> {
        let size = self.measure();
        let top = if center_vertically {
            rect.center().y - size.height / 2.0
        } else {
            rect.y0
        };
        self.content
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                let width = self.line_width(line);
                let x = match self.align {
                    TextAlign::Left => rect.x0,
                    TextAlign::Center => rect.center().x - width / 2.0,
                    TextAlign::Right => rect.x1 - width,
                };
                TextLine {
                    text: line.to_string(),
                    origin: Point::new(x, top + i as f64 * self.line_height()),
                    width,
                }
            })
            .collect()
    }

    /// Caret position (top of the caret) after the last character.
    pub fn caret(&self, rect: Rect, center_vertically: bool) -> Point {
        self.layout(rect, center_vertically)
            .last()
            .map(|line| Point::new(line.origin.x + line.width, line.origin.y))
            .unwrap_or_else(|| rect.origin())
    }

    pub fn insert_text(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn newline(&mut self) {
        self.content.push('\n');
    }

    /// Delete the last character. Returns `false` when already empty.
    pub fn backspace(&mut self) -> bool {
        self.content.pop().is_some()
    }
}
