//! The whiteboard: all board state plus the event reducer that drives it.

use crate::clipboard::{PasteContent, classify_paste};
use crate::color::Rgba;
use crate::config::BoardConfig;
use crate::document::ObjectLayer;
use crate::input::{InputState, Key, MouseButton, PointerEvent};
use crate::objects::{
    ImageObject, Label, LabeledShape, ObjectId, PlacedObject, ShapeKind, TextAlign, TextBox,
};
use crate::selection::Selection;
use crate::stroke::{Stroke, StrokeCapture, StrokeHistory};
use crate::tools::{Placement, Tool, ToolController};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pick radius around the pointer, in screen pixels.
const HIT_TOLERANCE: f64 = 4.0;

/// Tool toolbar commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ToolCommand {
    Select { tool: Tool },
    /// Toolbar button: selecting the active tool turns it off.
    Toggle { tool: Tool },
    SetColor { color: Rgba },
    SetWidth { width: f64 },
    IncreaseWidth,
    DecreaseWidth,
    SetHighlightOpacity { opacity: f64 },
}

/// Property-panel edits, applied to the selected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum ObjectEdit {
    SetBorderWidth { width: f64 },
    SetFill { color: Rgba },
    SetBorderColor { color: Rgba },
    SetTextColor { color: Rgba },
    SetFontSize { size: f64 },
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    SetAlign { align: TextAlign },
    Resize { factor: f64 },
    BringToFront,
    Delete,
}

/// Everything the host can feed into a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    Pointer(PointerEvent),
    Key(Key),
    Paste { text: String },
    /// Bytes fetched in answer to [`Effect::LoadImage`].
    ImageLoaded { url: String, data: Vec<u8> },
    Resize { width: f64, height: f64 },
    Tool(ToolCommand),
    Edit(ObjectEdit),
    Undo,
    Redo,
}

/// Work the host must do on the board's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Fetch the image and reply with [`BoardEvent::ImageLoaded`].
    LoadImage { url: String },
}

/// Result of handling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The visible frame changed.
    pub redraw: bool,
    pub effect: Option<Effect>,
}

impl Response {
    fn redraw(redraw: bool) -> Self {
        Self {
            redraw,
            effect: None,
        }
    }
}

/// Pointer drag in progress that is not a stroke.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Drag {
    #[default]
    None,
    Pan,
    Move(ObjectId),
}

/// Persistent part of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub viewport: Viewport,
    pub strokes: Vec<Stroke>,
    pub objects: Vec<PlacedObject>,
}

/// Board state. Every mutation goes through [`Whiteboard::handle`] or one
/// of the methods it dispatches to.
#[derive(Debug, Clone)]
pub struct Whiteboard {
    config: BoardConfig,
    viewport: Viewport,
    tools: ToolController,
    strokes: StrokeHistory,
    objects: ObjectLayer,
    selection: Selection,
    input: InputState,
    drag: Drag,
    /// Outstanding image loads per URL.
    pending_images: HashMap<String, usize>,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(BoardConfig::default(), Size::new(800.0, 600.0))
    }
}

impl Whiteboard {
    /// Create an empty board. A config that fails validation is replaced
    /// by the defaults.
    pub fn new(config: BoardConfig, size: Size) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("Ignoring board config: {err}");
                BoardConfig::default()
            }
        };
        Self {
            viewport: Viewport::new(size, &config.viewport),
            tools: ToolController::new(config.tools.clone()),
            strokes: StrokeHistory::new(),
            objects: ObjectLayer::new(),
            selection: Selection::new(),
            input: InputState::new(),
            drag: Drag::None,
            pending_images: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn strokes(&self) -> &StrokeHistory {
        &self.strokes
    }

    pub fn objects(&self) -> &ObjectLayer {
        &self.objects
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Stroke currently being drawn.
    pub fn in_progress(&self) -> Option<&StrokeCapture> {
        self.tools.in_progress()
    }

    /// Apply one event.
    pub fn handle(&mut self, event: BoardEvent) -> Response {
        match event {
            BoardEvent::Pointer(event) => Response::redraw(self.handle_pointer(event)),
            BoardEvent::Key(key) => Response::redraw(self.handle_key(key)),
            BoardEvent::Paste { text } => self.handle_paste(&text),
            BoardEvent::ImageLoaded { url, data } => {
                Response::redraw(self.handle_image_loaded(url, &data))
            }
            BoardEvent::Resize { width, height } => {
                if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
                    self.viewport.resize(Size::new(width, height));
                    Response::redraw(true)
                } else {
                    Response::default()
                }
            }
            BoardEvent::Tool(command) => Response::redraw(self.handle_tool(command)),
            BoardEvent::Edit(edit) => Response::redraw(self.apply_edit(edit)),
            BoardEvent::Undo => Response::redraw(self.strokes.undo()),
            BoardEvent::Redo => Response::redraw(self.strokes.redo()),
        }
    }

    fn commit(&mut self, stroke: Option<Stroke>) {
        if let Some(stroke) = stroke {
            self.strokes.commit(stroke);
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down {
                position,
                button,
                time_ms,
            } => {
                let double_click = self.input.press(position, button, time_ms);
                match button {
                    MouseButton::Middle => {
                        self.drag = Drag::Pan;
                        false
                    }
                    MouseButton::Right => false,
                    MouseButton::Left => self.primary_down(position, double_click),
                }
            }
            PointerEvent::Move { position } => {
                let delta = self.input.move_to(position);
                match self.drag {
                    Drag::Pan => {
                        self.viewport.pan(delta);
                        true
                    }
                    Drag::Move(id) => match self.objects.get_mut(id) {
                        Some(object) => {
                            object.translate(delta / self.viewport.scale);
                            true
                        }
                        None => false,
                    },
                    Drag::None => {
                        let local = self.viewport.screen_to_local(position);
                        if self.tools.is_sweeping() {
                            self.erase_strokes_at(local)
                        } else {
                            self.tools.extend_stroke(local)
                        }
                    }
                }
            }
            PointerEvent::Up { position, .. } | PointerEvent::Leave { position } => {
                self.input.release(position);
                self.finish_pointer()
            }
            PointerEvent::Wheel { delta, .. } => self.viewport.zoom_by_wheel(delta),
        }
    }

    fn primary_down(&mut self, position: Point, double_click: bool) -> bool {
        let local = self.viewport.screen_to_local(position);

        if let Some(placement) = self.tools.take_placement() {
            self.place(placement, local);
            return true;
        }

        if self.tools.tool().paint_mode().is_some() {
            let pending = self.tools.end_stroke();
            self.commit(pending);
            return self.tools.begin_stroke(local);
        }

        if self.tools.begin_sweep() {
            return self.erase_strokes_at(local);
        }

        let tolerance = HIT_TOLERANCE / self.viewport.scale;
        match self.objects.object_at(local, tolerance) {
            Some(id) => {
                let has_label = self.objects.get(id).is_some_and(|o| o.label().is_some());
                if double_click && has_label {
                    self.selection.enter_editing(id);
                } else {
                    self.selection.select(id);
                }
                self.drag = Drag::Move(id);
                true
            }
            None => {
                let had_selection = self.selection.selected().is_some();
                self.selection.clear();
                had_selection
            }
        }
    }

    fn erase_strokes_at(&mut self, local: Point) -> bool {
        let tolerance = HIT_TOLERANCE / self.viewport.scale;
        self.strokes.erase_at(local, tolerance)
    }

    /// Pointer-up and pointer-leave both end whatever the pointer was doing.
    fn finish_pointer(&mut self) -> bool {
        let dragged = !matches!(self.drag, Drag::None);
        self.drag = Drag::None;
        self.tools.end_sweep();
        let was_drawing = self.tools.in_progress().is_some();
        let stroke = self.tools.end_stroke();
        self.commit(stroke);
        was_drawing || dragged
    }

    fn place(&mut self, placement: Placement, at: Point) {
        let objects = &self.config.objects;
        let label = Label::new(
            objects.placeholder_text.clone(),
            objects.font_size,
            objects.text_color,
        );
        let object = match placement {
            Placement::Text => PlacedObject::Text(TextBox::new(at, objects.text_width, label)),
            Placement::Shape(kind) => {
                // Squares keep the sticky-note proportions; the others are regular.
                let size = match kind {
                    ShapeKind::Square => Size::new(objects.shape_width, objects.shape_height),
                    _ => Size::new(objects.shape_width, objects.shape_width),
                };
                let mut shape = LabeledShape::new(kind, at, size, label);
                shape.fill = objects.shape_fill;
                shape.border = objects.shape_border;
                shape.border_width = objects.shape_border_width;
                PlacedObject::Shape(shape)
            }
        };
        let id = self.objects.add(object);
        self.selection.select(id);
        log::info!("Placed {:?} at ({:.1}, {:.1})", placement, at.x, at.y);
    }

    fn handle_key(&mut self, key: Key) -> bool {
        if let Some(id) = self.selection.editing() {
            if key == Key::Escape {
                self.selection.exit_editing();
                return true;
            }
            let Some(label) = self.objects.get_mut(id).and_then(PlacedObject::label_mut) else {
                self.selection.exit_editing();
                return true;
            };
            return match key {
                Key::Char(text) => {
                    label.insert_text(&text);
                    true
                }
                Key::Backspace => label.backspace(),
                Key::Enter => {
                    label.newline();
                    true
                }
                Key::Delete | Key::Escape => false,
            };
        }

        match key {
            Key::Delete | Key::Backspace => self.delete_selected(),
            Key::Escape => {
                let had_selection = self.selection.selected().is_some();
                self.selection.clear();
                had_selection
            }
            Key::Enter | Key::Char(_) => false,
        }
    }

    fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.selected() else {
            return false;
        };
        self.selection.remove(id);
        self.objects.remove(id).is_some()
    }

    fn handle_paste(&mut self, text: &str) -> Response {
        if let Some(id) = self.selection.editing() {
            if let Some(label) = self.objects.get_mut(id).and_then(PlacedObject::label_mut) {
                label.insert_text(text);
                return Response::redraw(true);
            }
        }

        match classify_paste(text) {
            PasteContent::ImageUrl(url) => {
                let url = url.to_string();
                *self.pending_images.entry(url.clone()).or_default() += 1;
                Response {
                    redraw: false,
                    effect: Some(Effect::LoadImage { url }),
                }
            }
            PasteContent::Text(_) => {
                log::debug!("Ignoring pasted text outside of label editing");
                Response::default()
            }
        }
    }

    fn handle_image_loaded(&mut self, url: String, data: &[u8]) -> bool {
        match self.pending_images.get_mut(&url) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.pending_images.remove(&url);
            }
            None => {
                log::debug!("Ignoring image that was not requested: {url}");
                return false;
            }
        }
        let center = self.viewport.screen_to_local(self.viewport.midpoint());
        match ImageObject::from_bytes(data, center, self.config.objects.image_paste_scale, Some(url))
        {
            Ok(image) => {
                log::info!(
                    "Inserted {}x{} image",
                    image.natural_width,
                    image.natural_height
                );
                let id = self.objects.add(PlacedObject::Image(image));
                self.selection.select(id);
                true
            }
            Err(err) => {
                log::warn!("Failed to insert pasted image: {err}");
                false
            }
        }
    }

    fn handle_tool(&mut self, command: ToolCommand) -> bool {
        match command {
            ToolCommand::Select { tool } => {
                let finished = self.tools.select(tool);
                self.commit(finished);
                self.selection.exit_editing();
                true
            }
            ToolCommand::Toggle { tool } => {
                let finished = self.tools.toggle(tool);
                self.commit(finished);
                self.selection.exit_editing();
                true
            }
            ToolCommand::SetColor { color } => {
                self.tools.set_color(color);
                false
            }
            ToolCommand::SetWidth { width } => {
                self.tools.set_width(width);
                false
            }
            ToolCommand::IncreaseWidth => {
                self.tools.increase_width();
                false
            }
            ToolCommand::DecreaseWidth => {
                self.tools.decrease_width();
                false
            }
            ToolCommand::SetHighlightOpacity { opacity } => {
                self.tools.set_highlight_opacity(opacity);
                false
            }
        }
    }

    fn apply_edit(&mut self, edit: ObjectEdit) -> bool {
        let Some(id) = self.selection.selected() else {
            return false;
        };
        match edit {
            ObjectEdit::Delete => return self.delete_selected(),
            ObjectEdit::BringToFront => return self.objects.bring_to_front(id),
            _ => {}
        }

        let (min_font, max_font) = (
            self.config.objects.min_font_size,
            self.config.objects.max_font_size,
        );
        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        match edit {
            ObjectEdit::SetBorderWidth { width } => object
                .as_shape_mut()
                .map(|s| s.set_border_width(width))
                .is_some(),
            ObjectEdit::SetFill { color } => {
                object.as_shape_mut().map(|s| s.fill = color).is_some()
            }
            ObjectEdit::SetBorderColor { color } => {
                object.as_shape_mut().map(|s| s.border = color).is_some()
            }
            ObjectEdit::SetTextColor { color } => {
                object.label_mut().map(|l| l.color = color).is_some()
            }
            ObjectEdit::SetFontSize { size } => object
                .label_mut()
                .map(|l| l.set_font_size(size, min_font, max_font))
                .is_some(),
            ObjectEdit::ToggleBold => object.label_mut().map(|l| l.bold = !l.bold).is_some(),
            ObjectEdit::ToggleItalic => {
                object.label_mut().map(|l| l.italic = !l.italic).is_some()
            }
            ObjectEdit::ToggleUnderline => object
                .label_mut()
                .map(|l| l.underline = !l.underline)
                .is_some(),
            ObjectEdit::SetAlign { align } => {
                object.label_mut().map(|l| l.align = align).is_some()
            }
            ObjectEdit::Resize { factor } => {
                object.resize(factor, min_font, max_font);
                true
            }
            ObjectEdit::Delete | ObjectEdit::BringToFront => false,
        }
    }

    /// Persistent state: viewport, visible strokes and objects in z-order.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            viewport: self.viewport.clone(),
            strokes: self.strokes.visible().into_iter().cloned().collect(),
            objects: self.objects.ordered().cloned().collect(),
        }
    }

    /// Rebuild a board from a snapshot.
    ///
    /// Only the saved zoom and pan are restored; zoom limits and wheel
    /// sensitivity always come from `config`.
    pub fn from_snapshot(config: BoardConfig, snapshot: BoardSnapshot) -> Self {
        let mut board = Self::new(config, snapshot.viewport.size);
        board
            .viewport
            .restore(snapshot.viewport.scale, snapshot.viewport.origin_offset);
        for stroke in snapshot.strokes {
            board.strokes.commit(stroke);
        }
        for object in snapshot.objects {
            board.objects.add(object);
        }
        board
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    /// Parse a snapshot written by [`Whiteboard::to_json`].
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, on strokes with fewer than two points, and on
    /// a saved viewport whose size, scale or offset is not usable.
    pub fn from_json(config: BoardConfig, json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        let snapshot: BoardSnapshot = serde_json::from_str(json)?;
        let viewport = &snapshot.viewport;
        if !(viewport.scale.is_finite() && viewport.scale > 0.0) {
            return Err(serde_json::Error::custom(format!(
                "saved scale must be positive and finite, got {}",
                viewport.scale
            )));
        }
        if !viewport.origin_offset.is_finite() {
            return Err(serde_json::Error::custom("saved origin offset is not finite"));
        }
        let size = viewport.size;
        if !(size.is_finite() && size.width > 0.0 && size.height > 0.0) {
            return Err(serde_json::Error::custom(format!(
                "saved canvas size must be positive, got {}x{}",
                size.width, size.height
            )));
        }
        Ok(Self::from_snapshot(config, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::image::tests::png_bytes;
    use crate::stroke::PaintMode;

    fn down(x: f64, y: f64, time_ms: u64) -> BoardEvent {
        BoardEvent::Pointer(PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
            time_ms,
        })
    }

    fn mv(x: f64, y: f64) -> BoardEvent {
        BoardEvent::Pointer(PointerEvent::Move {
            position: Point::new(x, y),
        })
    }

    fn up(x: f64, y: f64) -> BoardEvent {
        BoardEvent::Pointer(PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        })
    }

    fn select(board: &mut Whiteboard, tool: Tool) {
        board.handle(BoardEvent::Tool(ToolCommand::Select { tool }));
    }

    #[test]
    fn test_ink_stroke_recorded() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(10.0, 10.0, 0));
        board.handle(mv(20.0, 10.0));
        board.handle(mv(20.0, 20.0));
        let response = board.handle(up(20.0, 20.0));
        assert!(response.redraw);

        let strokes = board.strokes().visible();
        assert_eq!(strokes.len(), 1);
        let stroke = &strokes[0];
        assert_eq!(stroke.mode(), PaintMode::Ink);
        assert_eq!(stroke.style().color, Rgba::BLACK);
        assert_eq!(stroke.style().width, 5.0);
        assert_eq!(
            stroke.points(),
            &[Point::new(10.0, 10.0), Point::new(20.0, 10.0), Point::new(20.0, 20.0)]
        );
    }

    #[test]
    fn test_click_without_move_discarded() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(10.0, 10.0, 0));
        board.handle(up(10.0, 10.0));
        assert!(board.strokes().is_empty());
    }

    #[test]
    fn test_leave_commits_like_up() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Highlight);
        board.handle(down(0.0, 0.0, 0));
        board.handle(mv(5.0, 5.0));
        board.handle(BoardEvent::Pointer(PointerEvent::Leave {
            position: Point::new(900.0, 5.0),
        }));
        assert_eq!(board.strokes().len(), 1);
        assert_eq!(board.strokes().visible()[0].mode(), PaintMode::Highlight);
        assert!(board.in_progress().is_none());
    }

    #[test]
    fn test_points_stored_in_local_space() {
        let mut board = Whiteboard::default();
        board.handle(BoardEvent::Pointer(PointerEvent::Wheel {
            position: Point::ZERO,
            delta: -693.0,
        }));
        let scale = board.viewport().scale;
        assert!(scale > 1.9 && scale < 2.1);

        select(&mut board, Tool::Ink);
        board.handle(down(400.0, 300.0, 0));
        board.handle(mv(420.0, 300.0));
        board.handle(up(420.0, 300.0));
        let visible = board.strokes().visible();
        let points = visible[0].points();
        assert!((points[0] - Point::new(400.0, 300.0)).hypot() < 1e-9);
        assert!((points[1].x - (400.0 + 20.0 / scale)).abs() < 1e-9);
    }

    #[test]
    fn test_tool_switch_mid_stroke_commits() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(0.0, 0.0, 0));
        board.handle(mv(5.0, 0.0));
        select(&mut board, Tool::Erase);
        assert_eq!(board.strokes().len(), 1);
        assert_eq!(board.tools().tool(), Tool::Erase);
        board.handle(mv(10.0, 0.0));
        assert!(board.in_progress().is_none());
    }

    #[test]
    fn test_stroke_eraser_removes_strokes_under_pointer() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(10.0, 10.0, 0));
        board.handle(mv(100.0, 10.0));
        board.handle(up(100.0, 10.0));
        board.handle(down(10.0, 80.0, 100));
        board.handle(mv(100.0, 80.0));
        board.handle(up(100.0, 80.0));

        select(&mut board, Tool::EraseStroke);
        // Pressing on empty canvas erases nothing; dragging across the
        // first stroke removes it.
        assert!(!board.handle(down(50.0, 40.0, 200)).redraw);
        assert!(board.handle(mv(50.0, 11.0)).redraw);
        assert!(!board.handle(mv(50.0, 12.0)).redraw);
        board.handle(up(50.0, 12.0));
        assert_eq!(board.strokes().len(), 1);
        assert_eq!(board.strokes().visible()[0].points()[0], Point::new(10.0, 80.0));

        // Moving without the button held erases nothing.
        board.handle(mv(50.0, 80.0));
        assert_eq!(board.strokes().len(), 1);

        assert!(board.handle(BoardEvent::Undo).redraw);
        assert_eq!(board.strokes().len(), 2);
        assert!(board.handle(BoardEvent::Redo).redraw);
        assert_eq!(board.strokes().len(), 1);
        assert_eq!(board.snapshot().strokes.len(), 1);
    }

    #[test]
    fn test_tool_switch_releases_stroke_eraser() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(0.0, 0.0, 0));
        board.handle(mv(100.0, 0.0));
        board.handle(up(100.0, 0.0));

        select(&mut board, Tool::EraseStroke);
        board.handle(down(50.0, 40.0, 100));
        select(&mut board, Tool::None);
        board.handle(mv(50.0, 0.0));
        assert_eq!(board.strokes().len(), 1);
        assert!(!board.tools().is_sweeping());
    }

    #[test]
    fn test_stroke_eraser_does_not_select_objects() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Text);
        board.handle(down(100.0, 100.0, 0));
        board.handle(up(100.0, 100.0));
        board.handle(BoardEvent::Key(Key::Escape));

        select(&mut board, Tool::EraseStroke);
        board.handle(down(100.0, 100.0, 1000));
        board.handle(mv(120.0, 100.0));
        board.handle(up(120.0, 100.0));
        assert!(board.selection().selected().is_none());
        assert_eq!(board.objects().len(), 1);
    }

    #[test]
    fn test_placement_is_one_shot() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Shape(ShapeKind::Pentagon));
        board.handle(down(200.0, 200.0, 0));
        assert_eq!(board.objects().len(), 1);
        assert_eq!(board.tools().tool(), Tool::None);

        let id = board.selection().selected().unwrap();
        let object = board.objects().get(id).unwrap();
        assert_eq!(object.bounds().center(), Point::new(200.0, 200.0));
        assert_eq!(object.label().unwrap().content, "Tap to edit");

        board.handle(up(200.0, 200.0));
        board.handle(down(600.0, 500.0, 1000));
        assert_eq!(board.objects().len(), 1);
        assert!(board.selection().selected().is_none());
    }

    #[test]
    fn test_double_click_enters_editing_and_typing() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Shape(ShapeKind::Square));
        board.handle(down(100.0, 100.0, 0));
        board.handle(up(100.0, 100.0));
        let id = board.selection().selected().unwrap();

        board.handle(down(100.0, 100.0, 1000));
        board.handle(up(100.0, 100.0));
        board.handle(down(101.0, 100.0, 1200));
        board.handle(up(101.0, 100.0));
        assert_eq!(board.selection().editing(), Some(id));
        assert_eq!(board.selection().selected(), Some(id));

        board.handle(BoardEvent::Key(Key::Backspace));
        board.handle(BoardEvent::Key(Key::Char("!".to_string())));
        board.handle(BoardEvent::Paste { text: " ok".to_string() });
        let label = board.objects().get(id).unwrap().label().unwrap();
        assert_eq!(label.content, "Tap to edi! ok");

        board.handle(BoardEvent::Key(Key::Escape));
        assert_eq!(board.selection().editing(), None);
        board.handle(BoardEvent::Key(Key::Delete));
        assert!(board.objects().is_empty());
    }

    #[test]
    fn test_drag_moves_object() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Text);
        board.handle(down(100.0, 100.0, 0));
        board.handle(up(100.0, 100.0));
        let id = board.selection().selected().unwrap();
        board.handle(down(100.0, 100.0, 2000));
        board.handle(mv(130.0, 110.0));
        board.handle(up(130.0, 110.0));
        let center = board.objects().get(id).unwrap().bounds().center();
        assert!((center - Point::new(130.0, 110.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_property_edits() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Shape(ShapeKind::Circle));
        board.handle(down(100.0, 100.0, 0));
        let id = board.selection().selected().unwrap();

        board.handle(BoardEvent::Edit(ObjectEdit::SetFontSize { size: 500.0 }));
        board.handle(BoardEvent::Edit(ObjectEdit::ToggleBold));
        board.handle(BoardEvent::Edit(ObjectEdit::SetAlign { align: TextAlign::Right }));
        board.handle(BoardEvent::Edit(ObjectEdit::SetFill { color: Rgba::WHITE }));
        board.handle(BoardEvent::Edit(ObjectEdit::SetBorderWidth { width: 3.0 }));

        let PlacedObject::Shape(shape) = board.objects().get(id).unwrap() else {
            panic!("expected a shape");
        };
        assert_eq!(shape.label.font_size, 96.0);
        assert!(shape.label.bold);
        assert_eq!(shape.label.align, TextAlign::Right);
        assert_eq!(shape.fill, Rgba::WHITE);
        assert_eq!(shape.border_width, 3.0);
    }

    #[test]
    fn test_image_paste_two_step() {
        let mut board = Whiteboard::default();
        let response = board.handle(BoardEvent::Paste {
            text: "https://example.com/cat.png".to_string(),
        });
        let Some(Effect::LoadImage { url }) = response.effect else {
            panic!("expected a load effect");
        };
        assert!(board.objects().is_empty());

        let response = board.handle(BoardEvent::ImageLoaded {
            url: url.clone(),
            data: png_bytes(200, 100),
        });
        assert!(response.redraw);
        let id = board.selection().selected().unwrap();
        let bounds = board.objects().get(id).unwrap().bounds();
        assert_eq!(bounds.size(), Size::new(100.0, 50.0));
        assert_eq!(bounds.center(), Point::new(400.0, 300.0));

        // Replies nobody asked for are dropped.
        let response = board.handle(BoardEvent::ImageLoaded {
            url,
            data: png_bytes(10, 10),
        });
        assert!(!response.redraw);
        assert_eq!(board.objects().len(), 1);
    }

    #[test]
    fn test_same_image_pasted_twice_inserts_twice() {
        let mut board = Whiteboard::default();
        let url = "https://example.com/cat.png".to_string();
        for _ in 0..2 {
            board.handle(BoardEvent::Paste { text: url.clone() });
        }
        for _ in 0..3 {
            board.handle(BoardEvent::ImageLoaded {
                url: url.clone(),
                data: png_bytes(20, 20),
            });
        }
        assert_eq!(board.objects().len(), 2);
    }

    #[test]
    fn test_bad_image_data_ignored() {
        let mut board = Whiteboard::default();
        board.handle(BoardEvent::Paste {
            text: "https://example.com/cat.png".to_string(),
        });
        let response = board.handle(BoardEvent::ImageLoaded {
            url: "https://example.com/cat.png".to_string(),
            data: b"not an image".to_vec(),
        });
        assert!(!response.redraw);
        assert!(board.objects().is_empty());
    }

    #[test]
    fn test_undo_redo_events() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(0.0, 0.0, 0));
        board.handle(mv(5.0, 0.0));
        board.handle(up(5.0, 0.0));
        assert!(board.handle(BoardEvent::Undo).redraw);
        assert!(board.strokes().is_empty());
        assert!(!board.handle(BoardEvent::Undo).redraw);
        assert!(board.handle(BoardEvent::Redo).redraw);
        assert_eq!(board.strokes().len(), 1);
    }

    #[test]
    fn test_middle_drag_pans() {
        let mut board = Whiteboard::default();
        board.handle(BoardEvent::Pointer(PointerEvent::Down {
            position: Point::new(10.0, 10.0),
            button: MouseButton::Middle,
            time_ms: 0,
        }));
        board.handle(mv(40.0, 30.0));
        assert_eq!(board.viewport().origin_offset, kurbo::Vec2::new(30.0, 20.0));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(0.0, 0.0, 0));
        board.handle(mv(5.0, 0.0));
        board.handle(up(5.0, 0.0));
        select(&mut board, Tool::Text);
        board.handle(down(50.0, 50.0, 0));

        let json = board.to_json().unwrap();
        let restored = Whiteboard::from_json(BoardConfig::default(), &json).unwrap();
        assert_eq!(restored.snapshot(), board.snapshot());
    }

    fn saved_board_json(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut board = Whiteboard::default();
        select(&mut board, Tool::Ink);
        board.handle(down(0.0, 0.0, 0));
        board.handle(mv(5.0, 0.0));
        board.handle(up(5.0, 0.0));
        let mut value: serde_json::Value = serde_json::from_str(&board.to_json().unwrap()).unwrap();
        edit(&mut value);
        value.to_string()
    }

    #[test]
    fn test_restore_takes_zoom_limits_from_config() {
        let json = saved_board_json(|value| {
            value["viewport"]["min_scale"] = 5.0.into();
            value["viewport"]["max_scale"] = 1.0.into();
            value["viewport"]["scale"] = 3.0.into();
        });
        let mut board = Whiteboard::from_json(BoardConfig::default(), &json).unwrap();
        assert_eq!(board.viewport().min_scale, 0.25);
        assert_eq!(board.viewport().max_scale, 4.0);
        assert_eq!(board.viewport().scale, 3.0);
        assert!(
            board
                .handle(BoardEvent::Pointer(PointerEvent::Wheel {
                    position: Point::ZERO,
                    delta: 100.0,
                }))
                .redraw
        );

        let mut config = BoardConfig::default();
        config.viewport.max_scale = 2.0;
        let mut board = Whiteboard::from_json(config, &json).unwrap();
        assert_eq!(board.viewport().scale, 2.0);
        for _ in 0..10 {
            board.handle(BoardEvent::Pointer(PointerEvent::Wheel {
                position: Point::ZERO,
                delta: -1000.0,
            }));
        }
        assert_eq!(board.viewport().scale, 2.0);
    }

    #[test]
    fn test_restore_keeps_saved_pan() {
        let json = saved_board_json(|value| {
            value["viewport"]["origin_offset"] = serde_json::json!({"x": 12.0, "y": -4.0});
        });
        let board = Whiteboard::from_json(BoardConfig::default(), &json).unwrap();
        assert_eq!(board.viewport().origin_offset, kurbo::Vec2::new(12.0, -4.0));
    }

    #[test]
    fn test_from_json_rejects_unusable_viewport() {
        for scale in [0.0, -2.0] {
            let json = saved_board_json(|value| value["viewport"]["scale"] = scale.into());
            let err = Whiteboard::from_json(BoardConfig::default(), &json).unwrap_err();
            assert!(err.to_string().contains("saved scale"), "{err}");
        }
        let json = saved_board_json(|value| value["viewport"]["size"]["width"] = 0.0.into());
        assert!(Whiteboard::from_json(BoardConfig::default(), &json).is_err());
    }

    #[test]
    fn test_from_json_rejects_single_point_stroke() {
        let json = saved_board_json(|value| {
            value["strokes"][0]["points"] = serde_json::json!([{"x": 1.0, "y": 1.0}]);
        });
        let err = Whiteboard::from_json(BoardConfig::default(), &json).unwrap_err();
        assert!(err.to_string().contains("at least two points"), "{err}");
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut config = BoardConfig::default();
        config.tools.min_width = 30.0;
        config.tools.max_width = 2.0;
        config.viewport.min_scale = 5.0;
        config.viewport.max_scale = 1.0;
        let mut board = Whiteboard::new(config, Size::new(800.0, 600.0));
        assert_eq!(board.config(), &BoardConfig::default());
        board.handle(BoardEvent::Tool(ToolCommand::SetWidth { width: 100.0 }));
        assert_eq!(board.tools().width(), 25.0);
        assert!(
            board
                .handle(BoardEvent::Pointer(PointerEvent::Wheel {
                    position: Point::ZERO,
                    delta: -100.0,
                }))
                .redraw
        );
    }

    #[test]
    fn test_event_script_json() {
        let events: Vec<BoardEvent> = serde_json::from_str(
            r##"[
                {"event":"tool","command":"select","tool":{"tool":"ink"}},
                {"event":"tool","command":"set_color","color":"#ff0000"},
                {"event":"pointer","kind":"down","position":{"x":1.0,"y":1.0},"button":"left"},
                {"event":"pointer","kind":"move","position":{"x":9.0,"y":1.0}},
                {"event":"pointer","kind":"up","position":{"x":9.0,"y":1.0},"button":"left"},
                {"event":"key","key":"escape"},
                {"event":"resize","width":1024.0,"height":768.0},
                {"event":"undo"}
            ]"##,
        )
        .unwrap();
        assert_eq!(events.len(), 8);
        let mut board = Whiteboard::default();
        for event in events.into_iter().take(5) {
            board.handle(event);
        }
        assert_eq!(board.strokes().visible()[0].style().color, Rgba::rgb(255, 0, 0));
    }
}
