// HistoryEntry - one recorded (forward, reverse) pair

use crate::diff::Diff;
use serde::{Deserialize, Serialize};

/// A change and its inverse, as recorded by the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub forward: Diff,
    pub reverse: Diff,
}

impl HistoryEntry {
    pub fn new(forward: Diff, reverse: Diff) -> Self {
        Self { forward, reverse }
    }

    /// Label shown in the undo/redo menus
    pub fn description(&self) -> String {
        self.forward.description()
    }
}
