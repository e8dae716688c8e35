//! The editing session: one image, its mask and everything needed to edit it.
//!
//! [`EditorSession`] owns the mask, the selection, the undo history, the
//! tool state machine and the view transform. Hosts feed it
//! [`InputEvent`]s and redraw from [`EditorSession::render`] whenever an
//! event returns [`Outcome::Redraw`].

mod handlers;
#[cfg(test)]
mod tests;

use std::fmt;
use std::path::Path;

use image::{GrayImage, RgbImage};

use crate::constants::{brush, canvas, clean, flood, zoom};
use crate::error::Result;
use crate::keybindings::Action;
use crate::mask::{ImageBuffer, MaskBuffer, MaskColor};
use crate::mask_ops::{self, CleanScope};
use crate::message::{EditorKey, InputEvent};
use crate::model::{
    HoverState, ModelRect, Selection, SelectionModel, SelectionRaster, Stroke, Tool, ToolState,
};
use crate::render::{self, Decoration, ViewMode};
use crate::undo::{EditAction, HistoryStack};
use crate::view_transform::{CanvasSize, ViewTransform, clamp_zoom};

/// Informational conditions that are reported instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Fill or delete requested without a selection
    NoActiveSelection,
    /// Undo requested with empty history
    NothingToUndo,
    /// Redo requested with empty redo history
    NothingToRedo,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Notice::NoActiveSelection => "No active selection",
            Notice::NothingToUndo => "Nothing to undo",
            Notice::NothingToRedo => "Nothing to redo",
        };
        f.write_str(text)
    }
}

/// Result of handling one event or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Model or decorations changed; the host should redraw
    Redraw,
    /// Nothing visible changed
    Unchanged,
    /// The user asked to save; the host exports the mask
    SaveRequested,
    /// A no-op worth telling the user about
    Notice(Notice),
}

impl Outcome {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, Outcome::Redraw)
    }
}

/// User-adjustable editing settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    /// Brush and line radius in model pixels
    pub brush_size: u32,
    pub brush_color: MaskColor,
    pub overlay_alpha: f32,
    pub view_mode: ViewMode,
    /// Kernel used by noise cleanup, always odd
    pub clean_kernel_size: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            brush_size: brush::DEFAULT_SIZE,
            brush_color: MaskColor::default(),
            overlay_alpha: crate::constants::overlay::DEFAULT_ALPHA,
            view_mode: ViewMode::default(),
            clean_kernel_size: clean::DEFAULT_KERNEL,
        }
    }
}

/// Summary for a status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub tool: Tool,
    pub state: &'static str,
    pub zoom: f32,
    pub brush_size: u32,
    pub brush_color: MaskColor,
    pub view_mode: ViewMode,
    pub undo_count: usize,
    pub redo_count: usize,
    pub selection: String,
    pub image_size: (u32, u32),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}x{} | zoom {:.0}% | brush {} {} | {} | {}",
            self.tool.name(),
            self.image_size.0,
            self.image_size.1,
            self.zoom * 100.0,
            self.brush_size,
            self.brush_color.name(),
            self.view_mode.name(),
            self.selection,
        )
    }
}

/// One open image and its mask.
#[derive(Debug, Clone)]
pub struct EditorSession {
    image: ImageBuffer,
    mask: MaskBuffer,
    selection: SelectionModel,
    history: HistoryStack,
    tool: Tool,
    state: ToolState,
    hover: HoverState,
    settings: EditorSettings,
    zoom: f32,
    canvas: CanvasSize,
    fallback: CanvasSize,
    transform: ViewTransform,
}

impl EditorSession {
    /// Start a session on `image`. Without a mask, a blank one is created;
    /// a mask of a different size is resampled to the image.
    pub fn new(image: ImageBuffer, mask: Option<MaskBuffer>) -> Result<Self> {
        let mask = fit_mask(&image, mask)?;
        let canvas = CanvasSize::new(0, 0);
        let fallback = CanvasSize::new(canvas::FALLBACK_WIDTH, canvas::FALLBACK_HEIGHT);
        let transform = ViewTransform::fit_or_fallback(
            image.width(),
            image.height(),
            canvas,
            fallback,
            1.0,
        );
        Ok(Self {
            image,
            mask,
            selection: SelectionModel::new(),
            history: HistoryStack::new(),
            tool: Tool::default(),
            state: ToolState::default(),
            hover: HoverState::default(),
            settings: EditorSettings::default(),
            zoom: 1.0,
            canvas,
            fallback,
            transform,
        })
    }

    /// Load an image and optional mask file into a new session.
    pub fn open(image_path: &Path, mask_path: Option<&Path>) -> Result<Self> {
        let image = ImageBuffer::load(image_path)?;
        let mask = match mask_path {
            Some(path) => Some(MaskBuffer::load(path, image.width(), image.height())?),
            None => None,
        };
        Self::new(image, mask)
    }

    /// Replace the image and mask, keeping settings and canvas.
    ///
    /// On error the session is left untouched. On success the selection,
    /// tool state, history and zoom are reset.
    pub fn load(&mut self, image: ImageBuffer, mask: Option<MaskBuffer>) -> Result<()> {
        let mask = fit_mask(&image, mask)?;
        log::info!("🖼️ Loaded {}x{} image", image.width(), image.height());
        self.image = image;
        self.mask = mask;
        self.selection.clear();
        self.history.clear();
        self.state = ToolState::Idle;
        self.hover = HoverState::default();
        self.zoom = 1.0;
        self.transform = self.compute_transform();
        Ok(())
    }

    /// File-backed variant of [`EditorSession::load`].
    pub fn load_files(&mut self, image_path: &Path, mask_path: Option<&Path>) -> Result<()> {
        let image = ImageBuffer::load(image_path)?;
        let mask = match mask_path {
            Some(path) => Some(MaskBuffer::load(path, image.width(), image.height())?),
            None => None,
        };
        self.load(image, mask)
    }

    /// The current mask, ready for the caller to encode.
    pub fn export_mask(&self) -> GrayImage {
        self.mask.export()
    }

    /// Encode the current mask as PNG.
    pub fn save_mask(&self, path: &Path) -> Result<()> {
        self.mask.save_png(path)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    pub fn mask(&self) -> &MaskBuffer {
        &self.mask
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    /// The rasterised selection, if there is a region to act on.
    pub fn selection_raster(&self) -> Option<&SelectionRaster> {
        self.selection.raster()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    /// User zoom multiplier (1.0 = fit to canvas).
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            tool: self.tool,
            state: self.state.name(),
            zoom: self.zoom,
            brush_size: self.settings.brush_size,
            brush_color: self.settings.brush_color,
            view_mode: self.settings.view_mode,
            undo_count: self.history.undo_count(),
            redo_count: self.history.redo_count(),
            selection: self.selection.selection().describe(),
            image_size: self.image.dimensions(),
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Feed one input event through the tool state machine.
    pub fn handle(&mut self, event: InputEvent) -> Outcome {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp { x, y } => self.pointer_up(x, y),
            InputEvent::Scroll(delta) => self.scroll(delta),
            InputEvent::Key(key) => self.key_press(key),
        }
    }

    pub fn key_press(&mut self, key: EditorKey) -> Outcome {
        match key {
            EditorKey::Undo => self.undo(),
            EditorKey::Redo => self.redo(),
            EditorKey::Escape => self.escape(),
            EditorKey::Save => Outcome::SaveRequested,
        }
    }

    /// Run a bound action. Image navigation is left to the host and
    /// reports [`Outcome::Unchanged`].
    pub fn perform(&mut self, action: Action) -> Outcome {
        match action {
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::Save => Outcome::SaveRequested,
            Action::Escape => self.escape(),
            Action::PreviousImage | Action::NextImage => Outcome::Unchanged,
            Action::SelectTool(tool) => self.set_tool(tool),
            Action::FillSelection => self.fill_selection(),
            Action::DeleteSelection => self.delete_selection(),
            Action::Invert => self.invert(),
            Action::CleanNoise => self.clean_noise(self.settings.clean_kernel_size),
            Action::ToggleMaskOnly => {
                self.toggle_mask_only();
                Outcome::Redraw
            }
            Action::ToggleImageOnly => {
                self.toggle_image_only();
                Outcome::Redraw
            }
            Action::ZoomIn => self.zoom_in(),
            Action::ZoomOut => self.zoom_out(),
            Action::ResetZoom => self.reset_zoom(),
        }
    }

    /// Drop the selection and any gesture in progress. Selection tools fall
    /// back to the brush.
    pub fn escape(&mut self) -> Outcome {
        self.selection.clear();
        self.state = ToolState::Idle;
        self.hover.vertex = None;
        self.hover.close_available = false;
        if self.tool.is_selection_tool() {
            log::debug!("Escape: switching from {} to Brush", self.tool.name());
            self.tool = Tool::Brush;
        }
        Outcome::Redraw
    }

    pub fn undo(&mut self) -> Outcome {
        if self.history.undo(&mut self.mask) {
            Outcome::Redraw
        } else {
            Outcome::Notice(Notice::NothingToUndo)
        }
    }

    pub fn redo(&mut self) -> Outcome {
        if self.history.redo(&mut self.mask) {
            Outcome::Redraw
        } else {
            Outcome::Notice(Notice::NothingToRedo)
        }
    }

    // ========================================================================
    // Tools and settings
    // ========================================================================

    /// Switch tools. The selection and tool state are reset.
    pub fn set_tool(&mut self, tool: Tool) -> Outcome {
        log::debug!("🔧 Tool: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
        self.selection.clear();
        self.state = ToolState::Idle;
        self.hover.vertex = None;
        self.hover.close_available = false;
        Outcome::Redraw
    }

    /// Set the brush radius, clamped to the supported range.
    pub fn set_brush_size(&mut self, size: u32) {
        self.settings.brush_size = size.clamp(brush::MIN_SIZE, brush::MAX_SIZE);
    }

    pub fn set_brush_color(&mut self, color: MaskColor) {
        self.settings.brush_color = color;
    }

    /// Set the overlay strength, clamped to `0.0..=1.0`. Non-finite values
    /// are ignored.
    pub fn set_overlay_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.settings.overlay_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.settings.view_mode = mode;
    }

    /// Switch between the overlay and the bare mask.
    pub fn toggle_mask_only(&mut self) {
        self.settings.view_mode = match self.settings.view_mode {
            ViewMode::MaskOnly => ViewMode::Overlay,
            _ => ViewMode::MaskOnly,
        };
    }

    /// Switch between the overlay and the bare image.
    pub fn toggle_image_only(&mut self) {
        self.settings.view_mode = match self.settings.view_mode {
            ViewMode::ImageOnly => ViewMode::Overlay,
            _ => ViewMode::ImageOnly,
        };
    }

    pub fn set_clean_kernel_size(&mut self, kernel_size: u32) {
        self.settings.clean_kernel_size = mask_ops::normalize_kernel_size(kernel_size);
    }

    /// Cap the number of undo snapshots kept. `None` removes the cap.
    pub fn set_max_history(&mut self, max_history: Option<usize>) {
        self.history.set_max_history(max_history);
    }

    // ========================================================================
    // Mask actions
    // ========================================================================

    /// Fill the selection with the brush colour.
    pub fn fill_selection(&mut self) -> Outcome {
        let Some(raster) = self.selection.raster() else {
            return Outcome::Notice(Notice::NoActiveSelection);
        };
        self.history.push_undo(&self.mask, EditAction::Fill);
        let changed = mask_ops::fill_selection(&mut self.mask, raster, self.settings.brush_color);
        log::debug!("Fill selection changed {} pixels", changed);
        Outcome::Redraw
    }

    /// Clear every pixel in the selection.
    pub fn delete_selection(&mut self) -> Outcome {
        let Some(raster) = self.selection.raster() else {
            return Outcome::Notice(Notice::NoActiveSelection);
        };
        self.history.push_undo(&self.mask, EditAction::Delete);
        let changed = mask_ops::delete_selection(&mut self.mask, raster);
        log::debug!("Delete selection cleared {} pixels", changed);
        Outcome::Redraw
    }

    pub fn invert(&mut self) -> Outcome {
        self.history.push_undo(&self.mask, EditAction::Invert);
        mask_ops::invert(&mut self.mask);
        Outcome::Redraw
    }

    /// Remove specks and fill holes, inside the selection if there is one.
    pub fn clean_noise(&mut self, kernel_size: u32) -> Outcome {
        self.set_clean_kernel_size(kernel_size);
        let scope = match (self.selection.selection(), self.selection.raster()) {
            (Selection::Rectangle(rect), _) => CleanScope::Rect(*rect),
            (Selection::Polygon(_), Some(raster)) => CleanScope::Region(raster),
            _ => CleanScope::Whole,
        };
        self.history.push_undo(&self.mask, EditAction::CleanNoise);
        let used = mask_ops::clean_noise(&mut self.mask, kernel_size, scope);
        log::info!("🧹 Cleaned mask noise with kernel {}", used);
        Outcome::Redraw
    }

    /// Flood fill with the brush colour from the pixel under a view point.
    pub fn flood_fill_at(&mut self, x: f32, y: f32) -> Outcome {
        if !self.transform.contains_view(x, y) {
            return Outcome::Unchanged;
        }
        let seed = self.transform.to_model(x, y);
        let color = self.settings.brush_color;
        if self.mask.get(seed.0, seed.1) == color.value() {
            return Outcome::Unchanged;
        }
        self.history.push_undo(&self.mask, EditAction::FloodFill);
        let filled = mask_ops::flood_fill(&mut self.mask, seed, color, flood::TOLERANCE);
        log::debug!("Flood fill from {:?} filled {} pixels", seed, filled);
        Outcome::Redraw
    }

    /// Drop the selection without changing tools.
    pub fn clear_selection(&mut self) -> Outcome {
        self.selection.clear();
        if matches!(
            self.state,
            ToolState::PolygonBuilding
                | ToolState::PolygonVertexDragging { .. }
                | ToolState::RectSelecting { .. }
        ) {
            self.state = ToolState::Idle;
        }
        self.hover.vertex = None;
        self.hover.close_available = false;
        Outcome::Redraw
    }

    /// Select a rectangle given in model pixels, clipped to the image.
    /// An empty rectangle clears the selection.
    pub fn select_rect(&mut self, rect: ModelRect) -> Outcome {
        let rect = rect.clipped(self.image.width(), self.image.height());
        if rect.is_empty() {
            return self.clear_selection();
        }
        self.state = ToolState::Idle;
        self.selection.set_rectangle(rect, &self.transform);
        Outcome::Redraw
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Multiply the zoom by `factor`, keeping it in range.
    pub fn zoom_by(&mut self, factor: f32) -> Outcome {
        self.set_zoom(self.zoom * factor)
    }

    pub fn zoom_in(&mut self) -> Outcome {
        self.zoom_by(zoom::STEP_IN)
    }

    pub fn zoom_out(&mut self) -> Outcome {
        self.zoom_by(zoom::STEP_OUT)
    }

    pub fn reset_zoom(&mut self) -> Outcome {
        self.set_zoom(1.0)
    }

    pub fn set_zoom(&mut self, zoom_factor: f32) -> Outcome {
        if !zoom_factor.is_finite() {
            return Outcome::Unchanged;
        }
        let zoom_factor = clamp_zoom(zoom_factor);
        if zoom_factor == self.zoom {
            return Outcome::Unchanged;
        }
        self.zoom = zoom_factor;
        self.update_transform()
    }

    /// Zoom one scroll step in (positive delta) or out (negative delta).
    pub fn scroll(&mut self, delta: f32) -> Outcome {
        if delta > 0.0 {
            self.zoom_by(zoom::SCROLL_IN)
        } else if delta < 0.0 {
            self.zoom_by(zoom::SCROLL_OUT)
        } else {
            Outcome::Unchanged
        }
    }

    /// The host canvas changed size.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> Outcome {
        self.canvas = CanvasSize::new(width, height);
        self.update_transform()
    }

    /// Canvas size assumed while the real canvas is not laid out.
    pub fn set_fallback_canvas(&mut self, width: u32, height: u32) -> Outcome {
        self.fallback = CanvasSize::new(width, height);
        self.update_transform()
    }

    fn compute_transform(&self) -> ViewTransform {
        ViewTransform::fit_or_fallback(
            self.image.width(),
            self.image.height(),
            self.canvas,
            self.fallback,
            self.zoom,
        )
    }

    /// Recompute the transform and re-project the selection onto it.
    fn update_transform(&mut self) -> Outcome {
        let next = self.compute_transform();
        if next == self.transform {
            return Outcome::Unchanged;
        }
        let previous = std::mem::replace(&mut self.transform, next);
        self.selection.reproject(&previous, &self.transform);
        self.hover = HoverState::default();
        log::debug!(
            "View transform: scale {:.3}, offset ({}, {})",
            self.transform.scale,
            self.transform.offset_x,
            self.transform.offset_y
        );
        Outcome::Redraw
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// View-space overlays for the current selection and tool.
    pub fn decorations(&self) -> Vec<Decoration> {
        let t = &self.transform;
        let to_view = |p: (u32, u32)| {
            let (x, y) = t.to_view(p.0, p.1);
            (x as f32, y as f32)
        };
        let mut out = Vec::new();

        let live_rect = match self.state {
            ToolState::RectSelecting { start, current } => {
                Some(ModelRect::from_corners(start, current))
            }
            _ => match self.selection.selection() {
                Selection::Rectangle(rect) => Some(*rect),
                _ => None,
            },
        };
        if let Some(rect) = live_rect {
            out.push(Decoration::RectOutline {
                top_left: to_view((rect.x, rect.y)),
                bottom_right: to_view((rect.x + rect.width, rect.y + rect.height)),
            });
        }

        if let Some(poly) = self.selection.polygon() {
            for (from, to) in poly.edges() {
                out.push(Decoration::Edge {
                    from: (from.x, from.y),
                    to: (to.x, to.y),
                });
            }
            let rubber_band = match (poly.vertices().last(), self.hover.cursor) {
                (Some(last), Some(cursor)) if !poly.is_closed() && !self.state.is_pressed() => {
                    Some((*last, cursor))
                }
                _ => None,
            };
            if let Some((last, cursor)) = rubber_band {
                out.push(Decoration::Preview {
                    from: (last.x, last.y),
                    to: cursor,
                });
            }
            for (i, v) in poly.vertices().iter().enumerate() {
                let hovered = self.hover.vertex == Some(i)
                    || (i == 0 && self.hover.close_available)
                    || self.state == ToolState::PolygonVertexDragging { vertex: i };
                out.push(Decoration::Vertex {
                    at: (v.x, v.y),
                    first: i == 0,
                    hovered,
                });
            }
        }

        if let ToolState::Drawing(Stroke::Line { start, end }) = self.state {
            out.push(Decoration::Preview {
                from: to_view(start),
                to: to_view(end),
            });
        }

        let footprint = self
            .hover
            .cursor
            .filter(|&(x, y)| !self.tool.is_selection_tool() && t.contains_view(x, y));
        if let Some(center) = footprint {
            out.push(Decoration::BrushFootprint {
                center,
                radius: self.settings.brush_size as f32 * t.scale,
            });
        }
        out
    }

    /// Composite the image and mask at model resolution.
    pub fn composite(&self) -> RgbImage {
        render::composite(
            &self.image,
            &self.mask,
            self.settings.overlay_alpha,
            self.settings.view_mode,
        )
    }

    /// Render the full canvas with decorations.
    pub fn render(&self) -> RgbImage {
        render::render_canvas(
            &self.image,
            &self.mask,
            self.settings.overlay_alpha,
            self.settings.view_mode,
            &self.transform,
            &self.decorations(),
        )
    }
}

/// Match a mask to an image: blank if absent, resampled if the size differs.
fn fit_mask(image: &ImageBuffer, mask: Option<MaskBuffer>) -> Result<MaskBuffer> {
    let (width, height) = image.dimensions();
    match mask {
        Some(mask) if mask.dimensions() == (width, height) => Ok(mask),
        Some(mask) => MaskBuffer::from_gray(mask.export(), width, height),
        None => MaskBuffer::blank(width, height),
    }
}
