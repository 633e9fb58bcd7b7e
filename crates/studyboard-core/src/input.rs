//! Pointer and keyboard events, plus the state needed to interpret them.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in screen coordinates. Touch input maps onto the same
/// variants with `button = Left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        /// Host timestamp, used for double-click detection.
        #[serde(default)]
        time_ms: u64,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    /// The pointer left the canvas.
    Leave {
        position: Point,
    },
    Wheel {
        position: Point,
        delta: f64,
    },
}

/// Keys the board reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "text", rename_all = "lowercase")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
    /// Printable text (one or more characters).
    Char(String),
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u64 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks the pointer across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position in screen coordinates.
    pub pointer_position: Point,
    last_click: Option<(u64, Point)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Returns `true` when it completes a double-click.
    ///
    /// A third press after a double-click starts a new sequence rather than
    /// registering a second double-click.
    pub fn press(&mut self, position: Point, button: MouseButton, time_ms: u64) -> bool {
        self.pointer_position = position;
        if button != MouseButton::Left {
            return false;
        }

        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = time_ms.saturating_sub(last_time);
            let distance = (position - last_pos).hypot();
            if elapsed < DOUBLE_CLICK_TIME_MS && distance < DOUBLE_CLICK_DISTANCE {
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((time_ms, position));
        false
    }

    /// Record a move, returning the delta from the previous position.
    pub fn move_to(&mut self, position: Point) -> Vec2 {
        let delta = position - self.pointer_position;
        self.pointer_position = position;
        delta
    }

    /// Pointer-up or pointer-leave at `position`.
    pub fn release(&mut self, position: Point) {
        self.pointer_position = position;
    }
}
