//! Pasted raster images.

use super::ObjectId;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;
use uuid::Uuid;

/// Image decoding errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to read image data: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Image has zero size")]
    Empty,
}

/// Read the natural pixel size from encoded image bytes.
pub fn decode_dimensions(data: &[u8]) -> Result<(u32, u32), ImageError> {
    let (width, height) = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(ImageError::Empty);
    }
    Ok((width, height))
}

/// A raster image placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    pub(crate) id: ObjectId,
    /// Top-left corner.
    pub position: Point,
    /// Display size.
    pub size: Size,
    pub natural_width: u32,
    pub natural_height: u32,
    /// Where the image was pasted from.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Encoded image bytes as base64 so snapshots stay plain JSON.
    pub data_base64: String,
}

impl ImageObject {
    /// Decode `data` and centre the image on `center` at `scale` times its
    /// natural size.
    pub fn from_bytes(
        data: &[u8],
        center: Point,
        scale: f64,
        source_url: Option<String>,
    ) -> Result<Self, ImageError> {
        let (natural_width, natural_height) = decode_dimensions(data)?;
        let size = Size::new(
            f64::from(natural_width) * scale,
            f64::from(natural_height) * scale,
        );
        Ok(Self {
            id: Uuid::new_v4(),
            position: Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
            size,
            natural_width,
            natural_height,
            source_url,
            data_base64: STANDARD.encode(data),
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Encoded image bytes.
    pub fn data(&self) -> Result<Vec<u8>, ImageError> {
        Ok(STANDARD.decode(&self.data_base64)?)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Scale about the centre.
    pub fn resize(&mut self, factor: f64) {
        let center = self.bounds().center();
        self.size = Size::new(self.size.width * factor, self.size.height * factor);
        self.position = Point::new(
            center.x - self.size.width / 2.0,
            center.y - self.size.height / 2.0,
        );
    }
}
