//! maskedit - binary mask editor for segmentation datasets
//!
//! The editing core is toolkit-agnostic: a host window feeds pointer, scroll
//! and key events into an [`EditorSession`] and paints the RGB canvas it
//! renders. The `maskedit` binary drives the same session API from the
//! command line, for single images or whole folders.

pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod keybindings;
pub mod mask;
pub mod mask_ops;
pub mod message;
pub mod model;
pub mod render;
pub mod session;
pub mod undo;
pub mod view_transform;

pub use batch::{BatchError, FolderSession};
pub use config::{ConfigError, EditorConfig};
pub use error::{EditorError, Result};
pub use keybindings::{Action, Key, KeyBindings, KeyChord};
pub use mask::{ImageBuffer, MaskBuffer, MaskColor};
pub use message::{EditorKey, InputEvent};
pub use model::{Selection, Tool, ToolState};
pub use render::{Decoration, ViewMode};
pub use session::{EditorSession, Notice, Outcome};
pub use undo::{EditAction, HistoryStack};
pub use view_transform::ViewTransform;
