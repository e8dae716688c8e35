//! Input events consumed by the editing session.
//!
//! Events are toolkit-agnostic: the host translates its own pointer and
//! keyboard events into these and feeds them to
//! [`EditorSession::handle`](crate::session::EditorSession::handle).
//! Coordinates are in view space.

/// Keys with a fixed meaning inside the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Restore the previous mask snapshot
    Undo,
    /// Re-apply an undone edit
    Redo,
    /// Cancel the selection and any gesture in progress
    Escape,
    /// Ask the host to export the mask
    Save,
}

/// Pointer and keyboard input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed
    PointerDown { x: f32, y: f32 },
    /// Pointer moved, with or without a button held
    PointerMove { x: f32, y: f32 },
    /// Primary button released
    PointerUp { x: f32, y: f32 },
    /// Wheel or trackpad scroll; positive zooms in
    Scroll(f32),
    /// Editor key pressed
    Key(EditorKey),
}
