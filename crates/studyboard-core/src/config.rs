//! Board configuration: viewport limits, grid look, tool defaults and bounds.
//!
//! Every field has a default, so an empty TOML file is a valid config and
//! partial files only override what they name.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a [`BoardConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Pan/zoom limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale multiplier per wheel unit: `scale * sensitivity^delta`.
    pub wheel_sensitivity: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.25,
            max_scale: 4.0,
            wheel_sensitivity: 0.999,
        }
    }
}

/// Background grid appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Logical spacing between grid dots/lines.
    pub spacing: f64,
    pub dot_radius: f64,
    pub color: Rgba,
    pub background: Rgba,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 30.0,
            dot_radius: 1.5,
            color: Rgba::rgb(0xb4, 0xb4, 0xb4),
            background: Rgba::rgb(0xfa, 0xfa, 0xfa),
        }
    }
}

/// Drawing tool defaults and bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub color: Rgba,
    pub width: f64,
    pub min_width: f64,
    pub max_width: f64,
    /// Amount the width moves per increase/decrease step.
    pub width_step: f64,
    pub highlight_opacity: f64,
    pub min_highlight_opacity: f64,
    pub max_highlight_opacity: f64,
    /// Highlighter strokes are this many times the current width.
    pub highlight_width_factor: f64,
    /// Eraser strokes are this many times the current width.
    pub erase_width_factor: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: 5.0,
            min_width: 1.0,
            max_width: 25.0,
            width_step: 5.0,
            highlight_opacity: 0.35,
            min_highlight_opacity: 0.05,
            max_highlight_opacity: 1.0,
            highlight_width_factor: 2.0,
            erase_width_factor: 2.0,
        }
    }
}

/// Defaults for placed objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    pub placeholder_text: String,
    pub text_width: f64,
    pub font_size: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub text_color: Rgba,
    pub shape_width: f64,
    pub shape_height: f64,
    pub shape_fill: Rgba,
    pub shape_border: Rgba,
    pub shape_border_width: f64,
    /// Pasted images are inserted at this fraction of their natural size.
    pub image_paste_scale: f64,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            placeholder_text: "Tap to edit".to_string(),
            text_width: 150.0,
            font_size: 12.0,
            min_font_size: 6.0,
            max_font_size: 96.0,
            text_color: Rgba::BLACK,
            shape_width: 150.0,
            shape_height: 100.0,
            shape_fill: Rgba::rgb(0xf0, 0xc0, 0x40),
            shape_border: Rgba::BLACK,
            shape_border_width: 1.0,
            image_paste_scale: 0.5,
        }
    }
}

/// Complete board configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub viewport: ViewportConfig,
    pub grid: GridConfig,
    pub tools: ToolConfig,
    pub objects: ObjectConfig,
}

impl BoardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        log::info!("Loaded board config from {}", path.display());
        Ok(config)
    }

    /// Check that every bound is finite and ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()?;
        self.grid.validate()?;
        self.tools.validate()?;
        self.objects.validate()
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale < self.max_scale && self.max_scale.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "viewport scale bounds must satisfy 0 < min < max (got {}..{})",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.wheel_sensitivity > 0.0 && self.wheel_sensitivity.is_finite()) {
            return Err(ConfigError::Invalid(
                "wheel_sensitivity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spacing > 0.0 && self.dot_radius >= 0.0) {
            return Err(ConfigError::Invalid(
                "grid spacing must be positive and dot radius non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl ToolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("width", self.min_width, self.max_width)?;
        if self.min_width <= 0.0 {
            return Err(ConfigError::Invalid("min_width must be positive".to_string()));
        }
        if !(self.width.is_finite() && self.width_step > 0.0) {
            return Err(ConfigError::Invalid(
                "width must be finite and width_step positive".to_string(),
            ));
        }
        check_range(
            "highlight_opacity",
            self.min_highlight_opacity,
            self.max_highlight_opacity,
        )?;
        if self.min_highlight_opacity < 0.0 || self.max_highlight_opacity > 1.0 {
            return Err(ConfigError::Invalid(
                "highlight opacity bounds must lie in [0, 1]".to_string(),
            ));
        }
        if !(self.highlight_width_factor > 0.0 && self.erase_width_factor > 0.0) {
            return Err(ConfigError::Invalid("width factors must be positive".to_string()));
        }
        Ok(())
    }
}

impl ObjectConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("font_size", self.min_font_size, self.max_font_size)?;
        if !(self.image_paste_scale > 0.0) {
            return Err(ConfigError::Invalid(
                "image_paste_scale must be positive".to_string(),
            ));
        }
        if !(self.text_width > 0.0 && self.shape_width > 0.0 && self.shape_height > 0.0) {
            return Err(ConfigError::Invalid(
                "object sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} bounds must be finite and ordered (got {min}..{max})"
        )))
    }
}
