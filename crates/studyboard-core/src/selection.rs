//! Selection and label-editing state for placed objects.

use crate::objects::ObjectId;
use kurbo::{Point, Rect};

/// The UI state of a placed object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObjectState {
    #[default]
    Normal,
    /// Selected: shows handles, can be moved and styled.
    Selected,
    /// Selected with its label accepting keystrokes.
    Editing,
}

impl ObjectState {
    /// Selected, whether or not the label is being edited.
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::Editing)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing)
    }
}

/// Single-object selection. Editing implies selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<ObjectId>,
    editing: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`, leaving editing unless it was already the edited object.
    pub fn select(&mut self, id: ObjectId) {
        if self.selected != Some(id) {
            self.editing = false;
        }
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.editing = false;
    }

    /// Start editing the label of `id`, selecting it if needed.
    pub fn enter_editing(&mut self, id: ObjectId) {
        self.selected = Some(id);
        self.editing = true;
    }

    /// Stop editing; the object stays selected.
    pub fn exit_editing(&mut self) {
        self.editing = false;
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Object whose label is being edited.
    pub fn editing(&self) -> Option<ObjectId> {
        self.selected.filter(|_| self.editing)
    }

    pub fn state(&self, id: ObjectId) -> ObjectState {
        match self.selected {
            Some(selected) if selected == id && self.editing => ObjectState::Editing,
            Some(selected) if selected == id => ObjectState::Selected,
            _ => ObjectState::Normal,
        }
    }

    /// Forget `id` if it was selected (object deleted).
    pub fn remove(&mut self, id: ObjectId) {
        if self.selected == Some(id) {
            self.clear();
        }
    }
}

/// Corner handle positions for a selected object's bounds.
pub fn corner_handles(bounds: Rect) -> [Point; 4] {
    [
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
        Point::new(bounds.x0, bounds.y1),
        Point::new(bounds.x1, bounds.y1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_states() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = Selection::new();
        assert_eq!(selection.state(a), ObjectState::Normal);

        selection.select(a);
        assert_eq!(selection.state(a), ObjectState::Selected);
        assert_eq!(selection.state(b), ObjectState::Normal);

        selection.enter_editing(a);
        assert!(selection.state(a).is_editing());
        assert!(selection.state(a).is_selected());
        assert_eq!(selection.editing(), Some(a));

        selection.select(a);
        assert_eq!(selection.editing(), Some(a));
        selection.select(b);
        assert_eq!(selection.editing(), None);
    }

    #[test]
    fn test_exit_editing_keeps_selection() {
        let a = Uuid::new_v4();
        let mut selection = Selection::new();
        selection.enter_editing(a);
        selection.exit_editing();
        assert_eq!(selection.selected(), Some(a));
        assert_eq!(selection.editing(), None);
        selection.remove(a);
        assert_eq!(selection.selected(), None);
    }
}
