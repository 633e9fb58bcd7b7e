//! Focus widget: a pomodoro timer and a to-do list.

mod timer;
mod todo;

pub use timer::{DEFAULT_DURATION_SECS, PomodoroTimer, TimerError, parse_duration};
pub use todo::{TodoError, TodoItem, TodoList};
