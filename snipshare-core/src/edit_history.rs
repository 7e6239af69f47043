//! Undo/redo over full content snapshots
//!
//! Two bounded LIFO stacks. Each entry is the complete content at that
//! point, so memory is bounded by depth × snippet size. A new distinct
//! snapshot invalidates the redo stack (branching history).

use std::collections::VecDeque;

/// Maximum entries kept on each stack.
pub const MAX_HISTORY_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct EditHistory {
    undo: VecDeque<String>,
    redo: Vec<String>,
    capacity: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_DEPTH)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a content value.
    ///
    /// Pushes a snapshot (and clears redo) only when `content` differs from
    /// the current top. Returns whether a snapshot was taken.
    pub fn record(&mut self, content: &str) -> bool {
        if self.undo.back().map(String::as_str) == Some(content) {
            return false;
        }
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(content.to_string());
        self.redo.clear();
        true
    }

    /// Step back one snapshot; returns the content to restore.
    pub fn undo(&mut self) -> Option<String> {
        if self.undo.len() < 2 {
            return None;
        }
        let current = self.undo.pop_back()?;
        if self.redo.len() == self.capacity {
            self.redo.remove(0);
        }
        self.redo.push(current);
        self.undo.back().cloned()
    }

    /// Re-apply the last undone snapshot; returns the content to restore.
    pub fn redo(&mut self) -> Option<String> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(next.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(values: &[&str]) -> EditHistory {
        let mut history = EditHistory::new();
        for v in values {
            history.record(v);
        }
        history
    }

    #[test]
    fn test_duplicate_snapshot_ignored() {
        let mut history = history_with(&["", "a"]);
        assert!(!history.record("a"));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_undo_requires_two_entries() {
        let mut history = history_with(&["only"]);
        assert_eq!(history.undo(), None);
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = history_with(&["", "a", "ab"]);
        assert_eq!(history.undo().as_deref(), Some("a"));
        assert_eq!(history.undo().as_deref(), Some(""));
        assert_eq!(history.undo(), None);

        // Restoring the undone content records nothing new.
        assert!(!history.record(""));

        assert_eq!(history.redo().as_deref(), Some("a"));
        assert!(!history.record("a"));
        assert_eq!(history.redo().as_deref(), Some("ab"));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = history_with(&["", "a", "ab"]);
        history.undo();
        assert!(history.can_redo());
        history.record("ax");
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut history = EditHistory::new();
        for i in 0..200 {
            history.record(&i.to_string());
            assert!(history.undo_depth() <= MAX_HISTORY_DEPTH);
        }
        assert_eq!(history.undo_depth(), MAX_HISTORY_DEPTH);

        let mut undone = 0;
        while history.undo().is_some() {
            undone += 1;
        }
        assert_eq!(undone, MAX_HISTORY_DEPTH - 1);
        assert!(history.redo_depth() <= MAX_HISTORY_DEPTH);
    }

    #[test]
    fn test_n_undos_restore_prior_content() {
        let edits = ["fn", "fn main", "fn main()", "fn main() {}"];
        let mut history = history_with(&["start"]);
        for e in edits {
            history.record(e);
        }
        let mut content = String::new();
        for _ in 0..edits.len() {
            content = history.undo().unwrap();
        }
        assert_eq!(content, "start");
    }
}
