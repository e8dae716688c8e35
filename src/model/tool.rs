//! Editing tools and the state of the gesture in progress.

use serde::{Deserialize, Serialize};

/// Editing tools available in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Freehand painting with a round brush
    #[default]
    Brush,
    /// Straight strokes between press and release
    Line,
    /// Rectangular selection
    RectangleSelect,
    /// Polygon selection with draggable vertices
    PolygonSelect,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Line => "Line",
            Tool::RectangleSelect => "Select",
            Tool::PolygonSelect => "Polygon Select",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Brush,
            Tool::Line,
            Tool::RectangleSelect,
            Tool::PolygonSelect,
        ]
    }

    /// Check if this tool builds a selection rather than painting.
    pub fn is_selection_tool(&self) -> bool {
        matches!(self, Tool::RectangleSelect | Tool::PolygonSelect)
    }
}

/// Stroke being painted by the Brush or Line tool, in model space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    /// Brush: each move strokes from `last` to the pointer
    Freehand { last: (u32, u32) },
    /// Line: only previewed until release
    Line { start: (u32, u32), end: (u32, u32) },
}

/// State of the gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    /// Not in a gesture.
    #[default]
    Idle,
    /// Painting with the brush or line tool.
    Drawing(Stroke),
    /// Dragging out a rectangle selection.
    RectSelecting { start: (u32, u32), current: (u32, u32) },
    /// Adding vertices to an open polygon.
    PolygonBuilding,
    /// Moving one polygon vertex.
    PolygonVertexDragging { vertex: usize },
}

impl ToolState {
    pub fn name(&self) -> &'static str {
        match self {
            ToolState::Idle => "Idle",
            ToolState::Drawing(_) => "Drawing",
            ToolState::RectSelecting { .. } => "RectSelecting",
            ToolState::PolygonBuilding => "PolygonBuilding",
            ToolState::PolygonVertexDragging { .. } => "PolygonVertexDragging",
        }
    }

    /// Check if a pointer button is currently held for this gesture.
    pub fn is_pressed(&self) -> bool {
        matches!(
            self,
            ToolState::Drawing(_)
                | ToolState::RectSelecting { .. }
                | ToolState::PolygonVertexDragging { .. }
        )
    }
}

/// What the pointer is hovering over while no button is held.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoverState {
    /// Last known pointer position in view space
    pub cursor: Option<(f32, f32)>,
    /// Polygon vertex under the pointer
    pub vertex: Option<usize>,
    /// Clicking now would close the polygon
    pub close_available: bool,
}
