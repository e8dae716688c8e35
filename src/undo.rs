//! Undo/Redo history for mask edits.
//!
//! Every raster mutation is preceded by a full snapshot of the mask. Undo
//! swaps the live buffer with the newest snapshot and parks the live buffer
//! on the redo stack; redo is the mirror image. Selection geometry is never
//! recorded here.

use crate::mask::MaskBuffer;

// ============================================================================
// Actions
// ============================================================================

/// The kind of edit a snapshot was taken for. Only used for descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Freehand brush stroke
    Brush,
    /// Straight line stroke
    Line,
    /// Fill of the selected region
    Fill,
    /// Delete of the selected region
    Delete,
    /// Whole-mask inversion
    Invert,
    /// Morphological cleanup
    CleanNoise,
    /// Seeded flood fill
    FloodFill,
}

impl EditAction {
    /// Get a human-readable description of this action
    pub fn description(&self) -> &'static str {
        match self {
            EditAction::Brush => "Brush stroke",
            EditAction::Line => "Line",
            EditAction::Fill => "Fill selection",
            EditAction::Delete => "Delete selection",
            EditAction::Invert => "Invert mask",
            EditAction::CleanNoise => "Clean noise",
            EditAction::FloodFill => "Flood fill",
        }
    }
}

/// One recorded mask state.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Full copy of the mask
    pub mask: MaskBuffer,
    /// The edit this entry undoes (or redoes)
    pub action: EditAction,
}

// ============================================================================
// History Stack
// ============================================================================

/// Configuration for the history stack
#[derive(Debug, Clone, Default)]
struct UndoConfig {
    /// Maximum number of snapshots to keep. `None` keeps everything.
    max_history: Option<usize>,
}

/// The undo/redo history stack.
///
/// Maintains two stacks:
/// - `undo_stack`: snapshots to restore on undo (most recent at the end)
/// - `redo_stack`: snapshots to restore on redo (most recent at the end)
///
/// Pushing a new snapshot clears `redo_stack`.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    config: UndoConfig,
}

impl HistoryStack {
    /// Create a new empty, unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the snapshot cap. Lowering it drops the oldest snapshots now.
    pub fn set_max_history(&mut self, max_history: Option<usize>) {
        self.config.max_history = max_history;
        self.enforce_limit();
    }

    pub fn max_history(&self) -> Option<usize> {
        self.config.max_history
    }

    fn enforce_limit(&mut self) {
        if let Some(max) = self.config.max_history {
            let excess = self.undo_stack.len().saturating_sub(max);
            if excess > 0 {
                log::debug!("Undo: dropping {} oldest snapshot(s)", excess);
                self.undo_stack.drain(..excess);
            }
        }
    }

    /// Snapshot `mask` before it is mutated by `action`.
    /// This clears the redo stack.
    pub fn push_undo(&mut self, mask: &MaskBuffer, action: EditAction) {
        log::debug!("Undo: pushed '{}'", action.description());
        self.undo_stack.push(HistoryEntry {
            mask: mask.clone(),
            action,
        });
        self.redo_stack.clear();
        self.enforce_limit();
    }

    /// Restore the newest snapshot into `live`, moving the current contents
    /// onto the redo stack. Returns false if there was nothing to undo.
    pub fn undo(&mut self, live: &mut MaskBuffer) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        log::debug!("Undo: '{}'", entry.action.description());
        let current = std::mem::replace(live, entry.mask);
        self.redo_stack.push(HistoryEntry {
            mask: current,
            action: entry.action,
        });
        true
    }

    /// Mirror of [`HistoryStack::undo`].
    pub fn redo(&mut self, live: &mut MaskBuffer) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("Redo: '{}'", entry.action.description());
        let current = std::mem::replace(live, entry.mask);
        self.undo_stack.push(HistoryEntry {
            mask: current,
            action: entry.action,
        });
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the edit that would be undone
    pub fn undo_description(&self) -> Option<&'static str> {
        self.undo_stack.last().map(|e| e.action.description())
    }

    /// Get the description of the edit that would be redone
    pub fn redo_description(&self) -> Option<&'static str> {
        self.redo_stack.last().map(|e| e.action.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("Undo history cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
