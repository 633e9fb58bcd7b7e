//! To-do list shown beside the timer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("To-do text is empty")]
    Empty,
    #[error("No to-do item with id {0}")]
    NotFound(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub done: bool,
}

/// Ordered to-do items. Ids are never reused within a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    items: Vec<TodoItem>,
    next_id: u64,
}

fn clean(text: &str) -> Result<String, TodoError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(TodoError::Empty)
    } else {
        Ok(trimmed.to_string())
    }
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item; surrounding whitespace is trimmed.
    pub fn add(&mut self, text: &str) -> Result<u64, TodoError> {
        let text = clean(text)?;
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(TodoItem {
            id,
            text,
            done: false,
        });
        Ok(id)
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut TodoItem, TodoError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(TodoError::NotFound(id))
    }

    /// Flip the done flag, returning the new value.
    pub fn toggle(&mut self, id: u64) -> Result<bool, TodoError> {
        let item = self.get_mut(id)?;
        item.done = !item.done;
        Ok(item.done)
    }

    pub fn rename(&mut self, id: u64, text: &str) -> Result<(), TodoError> {
        let text = clean(text)?;
        self.get_mut(id)?.text = text;
        Ok(())
    }

    pub fn remove(&mut self, id: u64) -> Result<TodoItem, TodoError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(TodoError::NotFound(id))?;
        Ok(self.items.remove(index))
    }

    /// Drop finished items, returning how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.done);
        before - self.items.len()
    }
}
