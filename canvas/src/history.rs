//! Linear undo/redo over whole-document snapshots.
//!
//! A frame is the full page list as it was immediately before a mutation.
//! The undo stack is bounded; when full, the oldest frame is dropped. Any new
//! frame clears the redo stack.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use tracing::trace;

use crate::consts::HISTORY_LIMIT;
use crate::doc::Page;

/// One history frame: a snapshot of every page.
pub type Frame = Vec<Page>;

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Frame>,
    redo: Vec<Frame>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history keeping at most `limit` undo frames.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { undo: VecDeque::new(), redo: Vec::new(), limit: limit.max(1) }
    }

    /// Push the pre-mutation snapshot and forget any redo frames.
    pub fn record(&mut self, snapshot: Frame) {
        self.push_undo(snapshot);
        self.redo.clear();
    }

    /// Step back: returns the frame to restore, moving `current` onto the redo stack.
    ///
    /// Returns `None` (and keeps `current` out of both stacks) when there is
    /// nothing to undo.
    pub fn undo(&mut self, current: Frame) -> Option<Frame> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward: returns the frame to restore, moving `current` onto the undo stack.
    pub fn redo(&mut self, current: Frame) -> Option<Frame> {
        let next = self.redo.pop()?;
        self.push_undo(current);
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Drop every frame, e.g. after loading a different project.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, frame: Frame) {
        self.undo.push_back(frame);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
            trace!(limit = self.limit, "history full; evicted oldest frame");
        }
    }
}
