//! Vello-based renderer implementation.

use crate::frame::{DrawCommand, Frame, TextStyle, normal_blend};
use crate::renderer::{RenderResult, Renderer, check_size};
use kurbo::{Affine, BezPath, Point, Rect, Shape as _, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use studyboard_core::objects::{ObjectId, TextLine};
use vello::Scene;

/// Vello-based renderer for GPU-accelerated 2D graphics.
///
/// Each frame layer becomes an isolated Vello layer. Commands with a
/// non-default blend mode (highlight multiply, erase dest-out) get their own
/// nested layer so they composite against the ink beneath them only.
pub struct VelloRenderer {
    scene: Scene,
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
    /// Decoded images by object id; `None` marks data that failed to decode.
    image_cache: HashMap<ObjectId, Option<peniko::ImageData>>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            image_cache: HashMap::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Drop cached images that `frame` no longer draws.
    fn prune_images(&mut self, frame: &Frame) {
        let live: HashSet<ObjectId> = frame
            .layers
            .iter()
            .flat_map(|layer| &layer.commands)
            .filter_map(|command| match command {
                DrawCommand::Image { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        let before = self.image_cache.len();
        self.image_cache.retain(|id, _| live.contains(id));
        if self.image_cache.len() < before {
            log::debug!("Dropped {} cached image(s)", before - self.image_cache.len());
        }
    }

    fn encode(&mut self, command: &DrawCommand, transform: Affine) {
        match command {
            DrawCommand::Fill { path, color, .. } => {
                self.scene
                    .fill(Fill::NonZero, transform, Color::from(*color), None, path);
            }
            DrawCommand::Stroke {
                path, width, color, ..
            } => {
                let stroke = Stroke::new(*width);
                self.scene
                    .stroke(&stroke, transform, Color::from(*color), None, path);
            }
            DrawCommand::Text { lines, style } => {
                for line in lines.iter().filter(|line| !line.text.is_empty()) {
                    self.render_text_line(line, style, transform);
                }
            }
            DrawCommand::Image { id, rect, data } => {
                self.render_image(*id, *rect, data.as_deref(), transform);
            }
        }
    }

    /// Lay out and draw one line of text with Parley.
    fn render_text_line(&mut self, line: &TextLine, style: &TextStyle, transform: Affine) {
        let brush = Brush::Solid(Color::from(style.color));

        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, &line.text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(style.font_size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
            "sans-serif".into(),
        )));
        if style.bold {
            builder.push_default(StyleProperty::FontWeight(parley::FontWeight::BOLD));
        }
        if style.italic {
            builder.push_default(StyleProperty::FontStyle(parley::FontStyle::Italic));
        }
        let mut layout = builder.build(&line.text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        let text_transform = transform * Affine::translate((line.origin.x, line.origin.y));
        let mut glyph_count = 0;

        for layout_line in layout.lines() {
            for item in layout_line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        glyph_count += 1;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        // No usable font: mark where the text would be.
        if glyph_count == 0 {
            let rect = Rect::new(
                line.origin.x,
                line.origin.y,
                line.origin.x + line.width.max(20.0),
                line.origin.y + style.font_size * 1.2,
            );
            self.scene.fill(
                Fill::NonZero,
                transform,
                Color::from_rgba8(255, 100, 100, 100),
                None,
                &rect,
            );
        }
    }

    fn decode_image(id: ObjectId, data: &[u8]) -> Option<peniko::ImageData> {
        match image::load_from_memory(data) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                Some(peniko::ImageData {
                    data: peniko::Blob::new(Arc::new(rgba.into_vec())),
                    format: peniko::ImageFormat::Rgba8,
                    width,
                    height,
                    alpha_type: peniko::ImageAlphaType::Alpha,
                })
            }
            Err(err) => {
                log::warn!("Failed to decode image {id}: {err}");
                None
            }
        }
    }

    fn render_image(&mut self, id: ObjectId, rect: Rect, data: Option<&[u8]>, transform: Affine) {
        let image_data = match self.image_cache.get(&id) {
            Some(cached) => cached.clone(),
            None => {
                let decoded = data.and_then(|data| Self::decode_image(id, data));
                self.image_cache.insert(id, decoded.clone());
                decoded
            }
        };

        let Some(image_data) = image_data else {
            self.render_image_placeholder(rect, transform);
            return;
        };

        let scale_x = rect.width() / f64::from(image_data.width);
        let scale_y = rect.height() / f64::from(image_data.height);
        let image_transform = transform
            * Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);
        self.scene.draw_image(&image_data.into(), image_transform);
    }

    /// Grey box with a cross for images that could not be decoded.
    fn render_image_placeholder(&mut self, rect: Rect, transform: Affine) {
        let rect_path = rect.to_path(0.1);
        self.scene.fill(
            Fill::NonZero,
            transform,
            Color::from_rgba8(200, 200, 200, 255),
            None,
            &rect_path,
        );

        let stroke = Stroke::new(2.0);
        let mut x_path = BezPath::new();
        x_path.move_to(Point::new(rect.x0, rect.y0));
        x_path.line_to(Point::new(rect.x1, rect.y1));
        x_path.move_to(Point::new(rect.x1, rect.y0));
        x_path.line_to(Point::new(rect.x0, rect.y1));
        self.scene.stroke(
            &stroke,
            transform,
            Color::from_rgba8(150, 150, 150, 255),
            None,
            &x_path,
        );
        self.scene.stroke(
            &stroke,
            transform,
            Color::from_rgba8(100, 100, 100, 255),
            None,
            &rect_path,
        );
    }
}

impl Renderer for VelloRenderer {
    fn render_frame(&mut self, frame: &Frame) -> RenderResult<()> {
        check_size(frame)?;
        self.scene.reset();
        self.prune_images(frame);

        let clip = frame.bounds();
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            Color::from(frame.background),
            None,
            &clip,
        );

        for layer in &frame.layers {
            self.scene
                .push_layer(normal_blend(), 1.0, Affine::IDENTITY, &clip);
            for command in &layer.commands {
                let blend = command.blend();
                let isolated = blend != normal_blend();
                if isolated {
                    self.scene.push_layer(blend, 1.0, Affine::IDENTITY, &clip);
                }
                self.encode(command, layer.transform);
                if isolated {
                    self.scene.pop_layer();
                }
            }
            self.scene.pop_layer();
        }
        Ok(())
    }
}
