//! Per-room stack of canvas snapshots for undo.

/// Canvas snapshots pushed by clients, most recent last.
///
/// Snapshots are opaque to the server (typically data URLs).
#[derive(Debug, Clone, Default)]
pub struct UndoPoints {
    points: Vec<String>,
}

impl UndoPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: impl Into<String>) {
        self.points.push(snapshot.into());
    }

    /// Returns the most recent snapshot without removing it.
    pub fn peek_last(&self) -> Option<&str> {
        self.points.last().map(String::as_str)
    }

    /// Removes and returns the most recent snapshot.
    pub fn pop_last(&mut self) -> Option<String> {
        self.points.pop()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
