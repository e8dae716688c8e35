//! Data models for the mask editor.

mod selection;
mod tool;

pub use selection::{ModelRect, Polygon, Selection, SelectionModel, SelectionRaster, ViewPoint};
pub use tool::{HoverState, Stroke, Tool, ToolState};
