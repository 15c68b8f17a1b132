use std::collections::VecDeque;

/// Undo depth for the paint canvas
pub const UNDO_MAX_DEPTH: usize = 10;

/// Bounded snapshot history for undo/redo.
///
/// Snapshots are full copies of the state taken *before* a destructive edit.
/// The undo stack drops its oldest entry past `capacity`; any fresh edit
/// invalidates the redo stack.
#[derive(Debug, Clone)]
pub struct SnapshotHistory<T> {
    /// Snapshots that can be restored by undo, oldest at the front
    undo_stack: VecDeque<T>,
    /// Snapshots that can be restored by redo, most recent at the back
    redo_stack: Vec<T>,
    capacity: usize,
}

impl<T> Default for SnapshotHistory<T> {
    fn default() -> Self {
        Self::new(UNDO_MAX_DEPTH)
    }
}

impl<T> SnapshotHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(capacity + 1),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    /// Record the pre-edit state of a destructive action
    pub fn record(&mut self, before: T) {
        self.undo_stack.push_back(before);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Swap `current` with the most recent undo snapshot.
    ///
    /// Returns false (leaving `current` untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: &mut T) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let replaced = std::mem::replace(current, previous);
        self.redo_stack.push(replaced);
        true
    }

    /// Swap `current` with the most recent redo snapshot
    pub fn redo(&mut self, current: &mut T) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        self.undo_stack.push_back(replaced);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget everything; used when the canvas is replaced wholesale
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_swap() {
        let mut history = SnapshotHistory::new(10);
        let mut state = 1;
        history.record(state);
        state = 2;

        assert!(history.undo(&mut state));
        assert_eq!(state, 1);
        assert!(history.redo(&mut state));
        assert_eq!(state, 2);
        assert!(!history.redo(&mut state));
        assert_eq!(state, 2);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = SnapshotHistory::new(3);
        let mut state = 0;
        for next in 1..=5 {
            history.record(state);
            state = next;
        }
        assert_eq!(history.undo_len(), 3);
        while history.undo(&mut state) {}
        // 0 and 1 were evicted
        assert_eq!(state, 2);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = SnapshotHistory::new(10);
        let mut state = 'a';
        history.record(state);
        state = 'b';
        history.undo(&mut state);
        assert!(history.can_redo());

        history.record(state);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_history_is_noop() {
        let mut history: SnapshotHistory<u8> = SnapshotHistory::default();
        let mut state = 7;
        assert!(!history.undo(&mut state));
        assert!(!history.redo(&mut state));
        assert_eq!(state, 7);
        assert_eq!(history.capacity(), UNDO_MAX_DEPTH);
    }
}
