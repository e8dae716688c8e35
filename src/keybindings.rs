//! Customizable keybindings for the mask editor.
//!
//! Keys are toolkit-agnostic; the host maps its own key events to [`Key`]
//! and asks [`KeyBindings::action_for`] what to do.

use serde::{Deserialize, Serialize};

use crate::model::Tool;

/// A key on the keyboard, independent of any windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Delete,
    Space,
    Plus,
    Minus,
}

/// A key with an optional Ctrl modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    #[serde(default)]
    pub ctrl: bool,
}

impl KeyChord {
    /// A plain key press.
    pub const fn key(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    /// The key with Ctrl held.
    pub const fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+{}", key_to_string(self.key))
        } else {
            f.write_str(key_to_string(self.key))
        }
    }
}

/// Something a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
    Redo,
    Save,
    Escape,
    PreviousImage,
    NextImage,
    SelectTool(Tool),
    FillSelection,
    DeleteSelection,
    Invert,
    CleanNoise,
    ToggleMaskOnly,
    ToggleImageOnly,
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

impl Action {
    /// Get the display name for this action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Undo => "Undo",
            Action::Redo => "Redo",
            Action::Save => "Save",
            Action::Escape => "Cancel selection",
            Action::PreviousImage => "Previous image",
            Action::NextImage => "Next image",
            Action::SelectTool(tool) => tool.name(),
            Action::FillSelection => "Fill selection",
            Action::DeleteSelection => "Delete selection",
            Action::Invert => "Invert mask",
            Action::CleanNoise => "Clean noise",
            Action::ToggleMaskOnly => "Mask only",
            Action::ToggleImageOnly => "Image only",
            Action::ZoomIn => "Zoom in",
            Action::ZoomOut => "Zoom out",
            Action::ResetZoom => "Reset zoom",
        }
    }
}

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub undo: KeyChord,
    pub redo: KeyChord,
    pub save: KeyChord,
    pub escape: KeyChord,
    pub previous_image: KeyChord,
    pub next_image: KeyChord,

    /// Hotkey for the Brush tool
    pub tool_brush: KeyChord,
    /// Hotkey for the Line tool
    pub tool_line: KeyChord,
    /// Hotkey for rectangle selection
    pub tool_rectangle: KeyChord,
    /// Hotkey for polygon selection
    pub tool_polygon: KeyChord,

    pub fill_selection: KeyChord,
    pub delete_selection: KeyChord,
    pub invert: KeyChord,
    pub clean_noise: KeyChord,
    pub toggle_mask_only: KeyChord,
    pub toggle_image_only: KeyChord,
    pub zoom_in: KeyChord,
    pub zoom_out: KeyChord,
    pub reset_zoom: KeyChord,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: KeyChord::ctrl(Key::Z),
            redo: KeyChord::ctrl(Key::Y),
            save: KeyChord::ctrl(Key::S),
            escape: KeyChord::key(Key::Escape),
            previous_image: KeyChord::key(Key::Left),
            next_image: KeyChord::key(Key::Right),

            tool_brush: KeyChord::key(Key::B),
            tool_line: KeyChord::key(Key::L),
            tool_rectangle: KeyChord::key(Key::R),
            tool_polygon: KeyChord::key(Key::P),

            fill_selection: KeyChord::key(Key::F),
            delete_selection: KeyChord::key(Key::Delete),
            invert: KeyChord::key(Key::I),
            clean_noise: KeyChord::key(Key::C),
            toggle_mask_only: KeyChord::key(Key::M),
            toggle_image_only: KeyChord::key(Key::O),
            zoom_in: KeyChord::key(Key::Plus),
            zoom_out: KeyChord::key(Key::Minus),
            reset_zoom: KeyChord::key(Key::Key0),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every binding, in a fixed order.
    pub fn bindings(&self) -> [(KeyChord, Action); 19] {
        [
            (self.undo, Action::Undo),
            (self.redo, Action::Redo),
            (self.save, Action::Save),
            (self.escape, Action::Escape),
            (self.previous_image, Action::PreviousImage),
            (self.next_image, Action::NextImage),
            (self.tool_brush, Action::SelectTool(Tool::Brush)),
            (self.tool_line, Action::SelectTool(Tool::Line)),
            (self.tool_rectangle, Action::SelectTool(Tool::RectangleSelect)),
            (self.tool_polygon, Action::SelectTool(Tool::PolygonSelect)),
            (self.fill_selection, Action::FillSelection),
            (self.delete_selection, Action::DeleteSelection),
            (self.invert, Action::Invert),
            (self.clean_noise, Action::CleanNoise),
            (self.toggle_mask_only, Action::ToggleMaskOnly),
            (self.toggle_image_only, Action::ToggleImageOnly),
            (self.zoom_in, Action::ZoomIn),
            (self.zoom_out, Action::ZoomOut),
            (self.reset_zoom, Action::ResetZoom),
        ]
    }

    /// Get the action that corresponds to a key press, if any.
    pub fn action_for(&self, chord: KeyChord) -> Option<Action> {
        self.bindings()
            .into_iter()
            .find(|(bound, _)| *bound == chord)
            .map(|(_, action)| action)
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: Tool) -> KeyChord {
        match tool {
            Tool::Brush => self.tool_brush,
            Tool::Line => self.tool_line,
            Tool::RectangleSelect => self.tool_rectangle,
            Tool::PolygonSelect => self.tool_polygon,
        }
    }

    /// Set the hotkey for a tool.
    pub fn set_tool_key(&mut self, tool: Tool, chord: KeyChord) {
        match tool {
            Tool::Brush => self.tool_brush = chord,
            Tool::Line => self.tool_line = chord,
            Tool::RectangleSelect => self.tool_rectangle = chord,
            Tool::PolygonSelect => self.tool_polygon = chord,
        }
    }

    /// Check if a chord is already used by any binding other than
    /// `exclude`. Returns the name of what it's used for, if anything.
    pub fn key_conflict(&self, chord: KeyChord, exclude: Option<Action>) -> Option<&'static str> {
        self.bindings()
            .into_iter()
            .find(|&(bound, action)| bound == chord && Some(action) != exclude)
            .map(|(_, action)| action.name())
    }
}

/// Convert a Key to a display string.
pub fn key_to_string(key: Key) -> &'static str {
    match key {
        Key::A => "A",
        Key::B => "B",
        Key::C => "C",
        Key::D => "D",
        Key::E => "E",
        Key::F => "F",
        Key::G => "G",
        Key::H => "H",
        Key::I => "I",
        Key::J => "J",
        Key::K => "K",
        Key::L => "L",
        Key::M => "M",
        Key::N => "N",
        Key::O => "O",
        Key::P => "P",
        Key::Q => "Q",
        Key::R => "R",
        Key::S => "S",
        Key::T => "T",
        Key::U => "U",
        Key::V => "V",
        Key::W => "W",
        Key::X => "X",
        Key::Y => "Y",
        Key::Z => "Z",
        Key::Key0 => "0",
        Key::Key1 => "1",
        Key::Key2 => "2",
        Key::Key3 => "3",
        Key::Key4 => "4",
        Key::Key5 => "5",
        Key::Key6 => "6",
        Key::Key7 => "7",
        Key::Key8 => "8",
        Key::Key9 => "9",
        Key::Left => "Left",
        Key::Right => "Right",
        Key::Up => "Up",
        Key::Down => "Down",
        Key::Escape => "Esc",
        Key::Delete => "Del",
        Key::Space => "Space",
        Key::Plus => "+",
        Key::Minus => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let kb = KeyBindings::default();
        assert_eq!(kb.action_for(KeyChord::ctrl(Key::Z)), Some(Action::Undo));
        assert_eq!(kb.action_for(KeyChord::ctrl(Key::Y)), Some(Action::Redo));
        assert_eq!(kb.action_for(KeyChord::ctrl(Key::S)), Some(Action::Save));
        assert_eq!(kb.action_for(KeyChord::key(Key::Escape)), Some(Action::Escape));
        assert_eq!(
            kb.action_for(KeyChord::key(Key::Right)),
            Some(Action::NextImage)
        );
        assert_eq!(
            kb.action_for(KeyChord::key(Key::P)),
            Some(Action::SelectTool(Tool::PolygonSelect))
        );
        // Plain Z is not undo
        assert_eq!(kb.action_for(KeyChord::key(Key::Z)), None);
    }

    #[test]
    fn test_default_bindings_have_no_conflicts() {
        let kb = KeyBindings::default();
        for (chord, action) in kb.bindings() {
            assert_eq!(kb.key_conflict(chord, Some(action)), None, "{}", chord);
        }
    }

    #[test]
    fn test_key_conflict_reports_owner() {
        let kb = KeyBindings::default();
        assert_eq!(kb.key_conflict(KeyChord::key(Key::B), None), Some("Brush"));
        assert_eq!(
            kb.key_conflict(KeyChord::key(Key::B), Some(Action::SelectTool(Tool::Brush))),
            None
        );
    }

    #[test]
    fn test_rebind_tool() {
        let mut kb = KeyBindings::default();
        kb.set_tool_key(Tool::Line, KeyChord::key(Key::N));
        assert_eq!(kb.key_for_tool(Tool::Line), KeyChord::key(Key::N));
        assert_eq!(
            kb.action_for(KeyChord::key(Key::N)),
            Some(Action::SelectTool(Tool::Line))
        );
        assert_eq!(kb.action_for(KeyChord::key(Key::L)), None);
    }

    #[test]
    fn test_chord_display() {
        assert_eq!(KeyChord::ctrl(Key::Z).to_string(), "Ctrl+Z");
        assert_eq!(KeyChord::key(Key::Left).to_string(), "Left");
    }

    #[test]
    fn test_serde_round_trip() {
        let kb = KeyBindings::default();
        let json = serde_json::to_string(&kb).unwrap();
        let back: KeyBindings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kb);

        // Missing fields fall back to defaults
        let partial: KeyBindings =
            serde_json::from_str(r#"{"undo":{"key":"U","ctrl":true}}"#).unwrap();
        assert_eq!(partial.undo, KeyChord::ctrl(Key::U));
        assert_eq!(partial.redo, KeyChord::ctrl(Key::Y));
    }
}
