//! Studyboard Core Library
//!
//! Platform-agnostic state and logic for the Studyboard whiteboard: strokes,
//! viewport, tools, placed objects and the event reducer that ties them
//! together, plus the focus timer and to-do list.

pub mod board;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod document;
pub mod focus;
pub mod input;
pub mod objects;
pub mod selection;
pub mod stroke;
pub mod tools;
pub mod viewport;

pub use board::{BoardEvent, BoardSnapshot, Effect, ObjectEdit, Response, ToolCommand, Whiteboard};
pub use color::{ColorError, Rgba};
pub use config::{BoardConfig, ConfigError};
pub use document::ObjectLayer;
pub use focus::{PomodoroTimer, TimerError, TodoList};
pub use input::{InputState, Key, MouseButton, PointerEvent};
pub use objects::{ObjectId, PlacedObject, ShapeKind};
pub use selection::{ObjectState, Selection};
pub use stroke::{
    HistoryEntry, InvalidStroke, PaintMode, Stroke, StrokeCapture, StrokeHistory, StrokeStyle,
};
pub use tools::{Tool, ToolController};
pub use viewport::Viewport;
