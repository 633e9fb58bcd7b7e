//! Frame construction: viewport transform, grid, strokes, then objects.

use crate::frame::{
    DrawCommand, Frame, Layer, LayerKind, TextStyle, erase_blend, highlight_blend, normal_blend,
};
use crate::renderer::{GridStyle, RenderContext};
use kurbo::{Affine, BezPath, Circle, Line, Point, Rect, Shape as _, Size};
use studyboard_core::color::Rgba;
use studyboard_core::objects::{Label, PlacedObject};
use studyboard_core::selection::corner_handles;
use studyboard_core::stroke::{PaintMode, StrokeStyle, polyline_path};

/// Selection outline padding, in screen pixels.
const SELECTION_PADDING: f64 = 4.0;
/// Corner handle half-size, in screen pixels.
const HANDLE_SIZE: f64 = 4.0;
/// Selection outline and caret width, in screen pixels.
const OVERLAY_STROKE: f64 = 1.5;
/// Grid line width, in screen pixels.
const GRID_LINE_WIDTH: f64 = 0.5;

impl Frame {
    /// Build the frame for the board in `ctx`.
    pub fn build(ctx: &RenderContext) -> Frame {
        let board = ctx.board;
        let viewport = board.viewport();
        let transform = Affine::scale(ctx.scale_factor) * viewport.transform();
        // Screen pixels to local units, so overlays keep a constant size.
        let px = 1.0 / viewport.scale;

        let mut grid = Layer::new(LayerKind::Grid, transform);
        build_grid(ctx, &mut grid, px);

        let visible = viewport.visible_rect();
        let mut ink = Layer::new(LayerKind::Ink, transform);
        for stroke in board.strokes().visible() {
            if stroke.bounds().intersect(visible).area() <= 0.0 {
                continue;
            }
            ink.push(stroke_command(stroke.mode(), stroke.style(), stroke.to_path()));
        }
        if let Some(capture) = board.in_progress() {
            if capture.len() >= 2 {
                ink.push(stroke_command(
                    capture.mode(),
                    capture.style(),
                    polyline_path(capture.points()),
                ));
            }
        }

        let mut objects = Layer::new(LayerKind::Objects, transform);
        for object in board.objects().ordered() {
            push_object(&mut objects, object);
            let state = board.selection().state(object.id());
            if state.is_selected() {
                push_selection(&mut objects, object.bounds(), ctx.selection_color, px);
            }
            if state.is_editing() {
                push_caret(&mut objects, object, px);
            }
        }

        log::trace!(
            "Built frame: {} strokes, {} objects",
            ink.commands.len(),
            objects.commands.len()
        );

        Frame {
            size: Size::new(
                viewport.size.width * ctx.scale_factor,
                viewport.size.height * ctx.scale_factor,
            ),
            background: ctx.background_color,
            layers: vec![grid, ink, objects],
        }
    }
}

/// Grid at a fixed screen spacing: logical spacing and dot size divided by
/// the zoom, drawn under the zoom transform.
fn build_grid(ctx: &RenderContext, layer: &mut Layer, px: f64) {
    let config = &ctx.board.config().grid;
    let spacing = config.spacing * px;
    if ctx.grid_style == GridStyle::None || !(spacing.is_finite() && spacing > 0.0) {
        return;
    }

    let visible = ctx.board.viewport().visible_rect();
    let start_x = (visible.x0 / spacing).floor() * spacing;
    let start_y = (visible.y0 / spacing).floor() * spacing;
    let end_x = (visible.x1 / spacing).ceil() * spacing;
    let end_y = (visible.y1 / spacing).ceil() * spacing;
    let columns = ((end_x - start_x) / spacing).round() as usize;
    let rows = ((end_y - start_y) / spacing).round() as usize;

    let mut path = BezPath::new();
    match ctx.grid_style {
        GridStyle::Dots => {
            let radius = config.dot_radius * px;
            for i in 0..=columns {
                for j in 0..=rows {
                    let center = Point::new(start_x + i as f64 * spacing, start_y + j as f64 * spacing);
                    path.extend(Circle::new(center, radius).path_elements(0.1));
                }
            }
            layer.push(DrawCommand::Fill {
                path,
                color: ctx.grid_color,
                blend: normal_blend(),
            });
        }
        GridStyle::Lines => {
            for i in 0..=columns {
                let x = start_x + i as f64 * spacing;
                path.move_to((x, start_y));
                path.line_to((x, end_y));
            }
            for j in 0..=rows {
                let y = start_y + j as f64 * spacing;
                path.move_to((start_x, y));
                path.line_to((end_x, y));
            }
            layer.push(DrawCommand::Stroke {
                path,
                width: GRID_LINE_WIDTH * px,
                color: ctx.grid_color,
                blend: normal_blend(),
            });
        }
        GridStyle::None => {}
    }
}

/// Stroke command with the mode's composition rule.
fn stroke_command(mode: PaintMode, style: &StrokeStyle, path: BezPath) -> DrawCommand {
    let (color, blend) = match mode {
        PaintMode::Ink => (style.color, normal_blend()),
        PaintMode::Highlight => (style.color.with_opacity(style.opacity), highlight_blend()),
        // Only the alpha matters for a cut-out.
        PaintMode::Erase => (Rgba::BLACK, erase_blend()),
    };
    DrawCommand::Stroke {
        path,
        width: style.width,
        color,
        blend,
    }
}

fn push_label(layer: &mut Layer, label: &Label, rect: Rect, center_vertically: bool) {
    let lines = label.layout(rect, center_vertically);
    if label.underline {
        let mut path = BezPath::new();
        for line in lines.iter().filter(|line| !line.text.is_empty()) {
            let y = line.origin.y + label.font_size * 1.05;
            path.move_to((line.origin.x, y));
            path.line_to((line.origin.x + line.width, y));
        }
        if !path.elements().is_empty() {
            layer.push(DrawCommand::Stroke {
                path,
                width: (label.font_size / 14.0).max(1.0),
                color: label.color,
                blend: normal_blend(),
            });
        }
    }
    layer.push(DrawCommand::Text {
        lines,
        style: TextStyle {
            font_size: label.font_size,
            color: label.color,
            bold: label.bold,
            italic: label.italic,
        },
    });
}

fn push_object(layer: &mut Layer, object: &PlacedObject) {
    match object {
        PlacedObject::Text(text) => push_label(layer, &text.label, text.bounds(), false),
        PlacedObject::Shape(shape) => {
            let outline = shape.outline();
            layer.push(DrawCommand::Fill {
                path: outline.clone(),
                color: shape.fill,
                blend: normal_blend(),
            });
            if shape.border_width > 0.0 {
                layer.push(DrawCommand::Stroke {
                    path: outline,
                    width: shape.border_width,
                    color: shape.border,
                    blend: normal_blend(),
                });
            }
            push_label(layer, &shape.label, shape.label_rect(), true);
        }
        PlacedObject::Image(image) => {
            let data = match image.data() {
                Ok(data) => Some(data),
                Err(err) => {
                    log::warn!("Image {} has unreadable data: {err}", image.id());
                    None
                }
            };
            layer.push(DrawCommand::Image {
                id: image.id(),
                rect: image.bounds(),
                data,
            });
        }
    }
}

fn push_selection(layer: &mut Layer, bounds: Rect, color: Rgba, px: f64) {
    let outline = bounds.inflate(SELECTION_PADDING * px, SELECTION_PADDING * px);
    layer.push(DrawCommand::Stroke {
        path: outline.to_path(0.1),
        width: OVERLAY_STROKE * px,
        color,
        blend: normal_blend(),
    });

    let half = HANDLE_SIZE * px;
    let mut handles = BezPath::new();
    for corner in corner_handles(outline) {
        handles.extend(Rect::from_center_size(corner, (half * 2.0, half * 2.0)).path_elements(0.1));
    }
    layer.push(DrawCommand::Fill {
        path: handles,
        color,
        blend: normal_blend(),
    });
}

fn push_caret(layer: &mut Layer, object: &PlacedObject, px: f64) {
    let (Some(label), Some((rect, center_vertically))) = (object.label(), object.label_frame())
    else {
        return;
    };
    let top = label.caret(rect, center_vertically);
    let caret = Line::new(top, Point::new(top.x, top.y + label.line_height()));
    layer.push(DrawCommand::Stroke {
        path: caret.to_path(0.1),
        width: OVERLAY_STROKE * px,
        color: label.color,
        blend: normal_blend(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderContext;
    use kurbo::Vec2;
    use studyboard_core::input::{Key, MouseButton, PointerEvent};
    use studyboard_core::objects::ShapeKind;
    use studyboard_core::tools::Tool;
    use studyboard_core::{BoardEvent, ToolCommand, Whiteboard};

    fn draw(board: &mut Whiteboard, tool: Tool, points: &[(f64, f64)]) {
        board.handle(BoardEvent::Tool(ToolCommand::Select { tool }));
        let (first, rest) = points.split_first().unwrap();
        board.handle(BoardEvent::Pointer(PointerEvent::Down {
            position: Point::new(first.0, first.1),
            button: MouseButton::Left,
            time_ms: 0,
        }));
        for (x, y) in rest {
            board.handle(BoardEvent::Pointer(PointerEvent::Move {
                position: Point::new(*x, *y),
            }));
        }
        let last = points.last().unwrap();
        board.handle(BoardEvent::Pointer(PointerEvent::Up {
            position: Point::new(last.0, last.1),
            button: MouseButton::Left,
        }));
    }

    #[test]
    fn test_layer_order() {
        let board = Whiteboard::default();
        let frame = Frame::build(&RenderContext::new(&board));
        let kinds: Vec<_> = frame.layers.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LayerKind::Grid, LayerKind::Ink, LayerKind::Objects]);
        assert_eq!(frame.size, Size::new(800.0, 600.0));
    }

    #[test]
    fn test_grid_dots_uniform_across_zoom() {
        let mut board = Whiteboard::default();
        let frame = Frame::build(&RenderContext::new(&board));
        // Dot at the origin, radius 1.5, spacing 30 on screen.
        assert!(frame.alpha_at(LayerKind::Grid, Point::new(0.0, 0.0)) > 0.0);
        assert!(frame.alpha_at(LayerKind::Grid, Point::new(30.0, 60.0)) > 0.0);
        assert_eq!(frame.alpha_at(LayerKind::Grid, Point::new(15.0, 15.0)), 0.0);

        board.handle(BoardEvent::Pointer(PointerEvent::Wheel {
            position: Point::ZERO,
            delta: -693.0,
        }));
        let frame = Frame::build(&RenderContext::new(&board));
        let origin = board.viewport().origin_offset;
        // Twenty grid steps from the (off-screen) local origin.
        let dot = Point::new(origin.x + 600.0, origin.y + 600.0);
        assert!(board.viewport().size.to_rect().contains(dot));
        assert!(frame.alpha_at(LayerKind::Grid, dot) > 0.0);
        assert!(frame.alpha_at(LayerKind::Grid, dot + Vec2::new(1.2, 0.0)) > 0.0);
        assert_eq!(frame.alpha_at(LayerKind::Grid, dot + Vec2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_no_grid() {
        let board = Whiteboard::default();
        let frame = Frame::build(&RenderContext::new(&board).with_grid(GridStyle::None));
        assert!(frame.layer(LayerKind::Grid).unwrap().commands.is_empty());
    }

    #[test]
    fn test_erase_cuts_ink_but_not_grid() {
        let mut board = Whiteboard::default();
        draw(&mut board, Tool::Ink, &[(20.0, 30.0), (100.0, 30.0)]);
        let before = Frame::build(&RenderContext::new(&board));
        let crossing = Point::new(60.0, 30.0);
        let dot = Point::new(60.0, 30.0);
        assert_eq!(before.alpha_at(LayerKind::Ink, crossing), 1.0);
        let grid_before = before.alpha_at(LayerKind::Grid, dot);
        assert!(grid_before > 0.0);

        draw(&mut board, Tool::Erase, &[(60.0, 0.0), (60.0, 60.0)]);
        let after = Frame::build(&RenderContext::new(&board));
        assert!(after.alpha_at(LayerKind::Ink, crossing) < before.alpha_at(LayerKind::Ink, crossing));
        assert_eq!(after.alpha_at(LayerKind::Ink, crossing), 0.0);
        assert_eq!(after.alpha_at(LayerKind::Ink, Point::new(25.0, 30.0)), 1.0);
        assert_eq!(after.alpha_at(LayerKind::Grid, dot), grid_before);
    }

    #[test]
    fn test_highlight_keeps_ink_visible() {
        let mut board = Whiteboard::default();
        draw(&mut board, Tool::Ink, &[(20.0, 100.0), (100.0, 100.0)]);
        draw(&mut board, Tool::Highlight, &[(20.0, 100.0), (100.0, 100.0)]);
        let frame = Frame::build(&RenderContext::new(&board));
        let ink = frame.layer(LayerKind::Ink).unwrap();
        let DrawCommand::Stroke { color, blend, width, .. } = &ink.commands[1] else {
            panic!("expected a stroke");
        };
        assert_eq!(*blend, highlight_blend());
        assert_eq!(color.a, 89);
        assert_eq!(*width, 10.0);
        assert!((frame.alpha_at(LayerKind::Ink, Point::new(50.0, 100.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_strokes_follow_viewport() {
        let mut board = Whiteboard::default();
        draw(&mut board, Tool::Ink, &[(400.0, 300.0), (420.0, 300.0)]);
        board.handle(BoardEvent::Pointer(PointerEvent::Wheel {
            position: Point::ZERO,
            delta: -693.0,
        }));
        let frame = Frame::build(&RenderContext::new(&board));
        let scale = board.viewport().scale;
        // Midpoint is the zoom anchor, so the stroke now extends twice as far.
        let far = Point::new(400.0 + 19.0 * scale, 300.0);
        assert_eq!(frame.alpha_at(LayerKind::Ink, far), 1.0);
    }

    #[test]
    fn test_offscreen_strokes_culled() {
        let mut board = Whiteboard::default();
        draw(&mut board, Tool::Ink, &[(20.0, 30.0), (100.0, 30.0)]);
        draw(&mut board, Tool::Ink, &[(700.0, 500.0), (790.0, 590.0)]);
        board.handle(BoardEvent::Pointer(PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Middle,
            time_ms: 0,
        }));
        board.handle(BoardEvent::Pointer(PointerEvent::Move {
            position: Point::new(-500.0, -400.0),
        }));
        let frame = Frame::build(&RenderContext::new(&board));
        assert_eq!(frame.layer(LayerKind::Ink).unwrap().commands.len(), 1);
        assert_eq!(frame.alpha_at(LayerKind::Ink, Point::new(250.0, 150.0)), 1.0);
    }

    #[test]
    fn test_erased_strokes_not_drawn() {
        let mut board = Whiteboard::default();
        draw(&mut board, Tool::Ink, &[(20.0, 30.0), (100.0, 30.0)]);
        draw(&mut board, Tool::EraseStroke, &[(60.0, 30.0), (61.0, 30.0)]);
        let frame = Frame::build(&RenderContext::new(&board));
        assert!(frame.layer(LayerKind::Ink).unwrap().commands.is_empty());

        board.handle(BoardEvent::Undo);
        let frame = Frame::build(&RenderContext::new(&board));
        assert_eq!(frame.alpha_at(LayerKind::Ink, Point::new(60.0, 30.0)), 1.0);
    }

    #[test]
    fn test_in_progress_stroke_drawn() {
        let mut board = Whiteboard::default();
        board.handle(BoardEvent::Tool(ToolCommand::Select { tool: Tool::Ink }));
        board.handle(BoardEvent::Pointer(PointerEvent::Down {
            position: Point::new(10.0, 10.0),
            button: MouseButton::Left,
            time_ms: 0,
        }));
        let frame = Frame::build(&RenderContext::new(&board));
        assert!(frame.layer(LayerKind::Ink).unwrap().commands.is_empty());

        board.handle(BoardEvent::Pointer(PointerEvent::Move {
            position: Point::new(50.0, 10.0),
        }));
        let frame = Frame::build(&RenderContext::new(&board));
        assert_eq!(frame.layer(LayerKind::Ink).unwrap().commands.len(), 1);
    }

    #[test]
    fn test_selected_shape_has_outline_and_editing_caret() {
        let mut board = Whiteboard::default();
        board.handle(BoardEvent::Tool(ToolCommand::Select {
            tool: Tool::Shape(ShapeKind::Square),
        }));
        board.handle(BoardEvent::Pointer(PointerEvent::Down {
            position: Point::new(200.0, 200.0),
            button: MouseButton::Left,
            time_ms: 0,
        }));
        let frame = Frame::build(&RenderContext::new(&board));
        // fill, border, label, outline, handles
        assert_eq!(frame.layer(LayerKind::Objects).unwrap().commands.len(), 5);
        assert!(frame.is_covered(Point::new(200.0, 200.0)));

        let id = board.selection().selected().unwrap();
        board.handle(BoardEvent::Key(Key::Escape));
        let frame = Frame::build(&RenderContext::new(&board));
        assert_eq!(frame.layer(LayerKind::Objects).unwrap().commands.len(), 3);
        assert!(board.objects().get(id).is_some());
    }

    #[test]
    fn test_hidpi_scale_factor() {
        let board = Whiteboard::default();
        let frame = Frame::build(&RenderContext::new(&board).with_scale_factor(2.0));
        assert_eq!(frame.size, Size::new(1600.0, 1200.0));
        assert!(frame.alpha_at(LayerKind::Grid, Point::new(60.0, 60.0)) > 0.0);
    }
}
