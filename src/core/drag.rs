//! Drag-and-drop reordering of the span side panel.
//!
//! Drag start records the source index, drag enter records the target, and
//! drop commits the move. A drop that would not move anything yields no list,
//! so no update action is dispatched.

use super::collection;
use crate::domain::TextSpan;

/// In-progress drag gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    from: Option<usize>,
    to: Option<usize>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer went down on the item at `index`
    pub fn start(&mut self, index: usize) {
        self.from = Some(index);
        self.to = None;
    }

    /// Pointer moved over the item at `index`
    pub fn enter(&mut self, index: usize) {
        if self.from.is_some() {
            self.to = Some(index);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.from.is_some()
    }

    /// Give up the gesture without moving anything
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Finish the gesture.
    ///
    /// Returns the reordered list to dispatch as an update, or `None` when the
    /// drop is a no-op. The gesture is cleared either way.
    pub fn drop_onto(&mut self, spans: &[TextSpan]) -> Option<Vec<TextSpan>> {
        let gesture = std::mem::take(self);
        let (from, to) = (gesture.from?, gesture.to?);
        collection::reorder(spans, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans() -> Vec<TextSpan> {
        ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, t)| TextSpan::new("doc", *t, i * 2, i * 2 + 1))
            .collect()
    }

    #[test]
    fn test_drag_commits_move() {
        let mut drag = DragState::new();
        drag.start(0);
        drag.enter(1);
        drag.enter(2);

        let moved = drag.drop_onto(&spans()).unwrap();
        let texts: Vec<&str> = moved.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "a"]);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_drop_on_self_emits_nothing() {
        let mut drag = DragState::new();
        drag.start(1);
        drag.enter(1);
        assert!(drag.drop_onto(&spans()).is_none());
    }

    #[test]
    fn test_drop_without_target_emits_nothing() {
        let mut drag = DragState::new();
        drag.start(1);
        assert!(drag.drop_onto(&spans()).is_none());

        drag.enter(2);
        assert!(drag.drop_onto(&spans()).is_none());
    }

    #[test]
    fn test_cancel() {
        let mut drag = DragState::new();
        drag.start(2);
        drag.enter(0);
        drag.cancel();
        assert!(drag.drop_onto(&spans()).is_none());
    }
}
