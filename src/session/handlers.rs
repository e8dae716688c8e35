//! Pointer handlers for the tool state machine.
//!
//! Each handler processes one pointer event for the active tool, keeping
//! [`EditorSession::handle`] a plain dispatcher.

use super::{EditorSession, Outcome};
use crate::mask_ops;
use crate::model::{ModelRect, Stroke, Tool, ToolState, ViewPoint};
use crate::undo::EditAction;

impl EditorSession {
    /// Handle a primary button press at a view-space point.
    pub(super) fn pointer_down(&mut self, x: f32, y: f32) -> Outcome {
        if !self.transform.contains_view(x, y) {
            log::trace!("Pointer down outside image at ({}, {})", x, y);
            return Outcome::Unchanged;
        }
        let point = self.transform.to_model(x, y);
        let radius = self.settings.brush_size;
        let color = self.settings.brush_color;

        match self.tool {
            Tool::Brush => {
                self.history.push_undo(&self.mask, EditAction::Brush);
                mask_ops::stamp(&mut self.mask, point, radius, color);
                self.state = ToolState::Drawing(Stroke::Freehand { last: point });
            }
            Tool::Line => {
                self.history.push_undo(&self.mask, EditAction::Line);
                self.state = ToolState::Drawing(Stroke::Line {
                    start: point,
                    end: point,
                });
            }
            Tool::RectangleSelect => {
                self.selection.clear();
                self.state = ToolState::RectSelecting {
                    start: point,
                    current: point,
                };
            }
            Tool::PolygonSelect => self.polygon_down(ViewPoint::new(x, y)),
        }
        Outcome::Redraw
    }

    /// Close, grab a vertex, or add a vertex, in that order.
    fn polygon_down(&mut self, point: ViewPoint) {
        if let Some(poly) = self.selection.polygon() {
            if poly.is_near_first_vertex(point) {
                if let Some(poly) = self.selection.polygon_mut() {
                    poly.close();
                }
                self.selection.refresh_raster(&self.transform);
                self.state = ToolState::Idle;
                self.hover.vertex = None;
                self.hover.close_available = false;
                log::debug!("⬡ Polygon closed");
                return;
            }
            if let Some(vertex) = poly.hit_vertex(point) {
                self.state = ToolState::PolygonVertexDragging { vertex };
                return;
            }
        }

        // A closed polygon (or any other selection) is replaced here
        self.selection.push_polygon_vertex(point);
        self.state = ToolState::PolygonBuilding;
    }

    /// Handle pointer motion, with or without a button held.
    pub(super) fn pointer_move(&mut self, x: f32, y: f32) -> Outcome {
        self.hover.cursor = Some((x, y));
        let inside = self.transform.contains_view(x, y);

        match self.state {
            ToolState::Drawing(Stroke::Freehand { last }) => {
                if !inside {
                    return Outcome::Unchanged;
                }
                let point = self.transform.to_model(x, y);
                mask_ops::stroke(
                    &mut self.mask,
                    last,
                    point,
                    self.settings.brush_size,
                    self.settings.brush_color,
                );
                self.state = ToolState::Drawing(Stroke::Freehand { last: point });
                Outcome::Redraw
            }
            ToolState::Drawing(Stroke::Line { start, .. }) => {
                if !inside {
                    return Outcome::Unchanged;
                }
                let end = self.transform.to_model(x, y);
                self.state = ToolState::Drawing(Stroke::Line { start, end });
                Outcome::Redraw
            }
            ToolState::RectSelecting { start, .. } => {
                let current = self.transform.to_model(x, y);
                self.state = ToolState::RectSelecting { start, current };
                Outcome::Redraw
            }
            ToolState::PolygonVertexDragging { vertex } => {
                self.drag_vertex(vertex, ViewPoint::new(x, y));
                Outcome::Redraw
            }
            ToolState::Idle | ToolState::PolygonBuilding => self.update_hover(x, y),
        }
    }

    /// Handle a primary button release. Always completes the gesture.
    pub(super) fn pointer_up(&mut self, x: f32, y: f32) -> Outcome {
        let point = self.transform.to_model(x, y);

        match self.state {
            ToolState::Drawing(Stroke::Freehand { .. }) => {
                self.state = ToolState::Idle;
                Outcome::Redraw
            }
            ToolState::Drawing(Stroke::Line { start, .. }) => {
                mask_ops::stroke(
                    &mut self.mask,
                    start,
                    point,
                    self.settings.brush_size,
                    self.settings.brush_color,
                );
                self.state = ToolState::Idle;
                Outcome::Redraw
            }
            ToolState::RectSelecting { start, .. } => {
                let rect = ModelRect::from_corners(start, point);
                if rect.is_empty() {
                    self.selection.clear();
                } else {
                    log::debug!("Rectangle selection {:?}", rect);
                    self.selection.set_rectangle(rect, &self.transform);
                }
                self.state = ToolState::Idle;
                Outcome::Redraw
            }
            ToolState::PolygonVertexDragging { vertex } => {
                self.drag_vertex(vertex, ViewPoint::new(x, y));
                self.state = ToolState::Idle;
                Outcome::Redraw
            }
            ToolState::Idle | ToolState::PolygonBuilding => Outcome::Unchanged,
        }
    }

    fn drag_vertex(&mut self, vertex: usize, point: ViewPoint) {
        let Some(poly) = self.selection.polygon_mut() else {
            return;
        };
        poly.move_vertex(vertex, point);
        if poly.is_closed() {
            self.selection.refresh_raster(&self.transform);
        }
    }

    /// Track what the pointer is over while no button is held.
    fn update_hover(&mut self, x: f32, y: f32) -> Outcome {
        let before = (self.hover.vertex, self.hover.close_available);
        let point = ViewPoint::new(x, y);

        let (vertex, close_available, open) = match (self.tool, self.selection.polygon()) {
            (Tool::PolygonSelect, Some(poly)) => (
                poly.hit_vertex(point),
                poly.is_near_first_vertex(point),
                !poly.is_closed(),
            ),
            _ => (None, false, false),
        };
        self.hover.vertex = vertex;
        self.hover.close_available = close_available;

        // Brush footprint and rubber band follow the cursor
        let follows_cursor = matches!(self.tool, Tool::Brush | Tool::Line) || open;
        if follows_cursor || before != (vertex, close_available) {
            Outcome::Redraw
        } else {
            Outcome::Unchanged
        }
    }
}
