//! Fit-to-canvas and zoom mathematics.
//!
//! Converts between view space (pixels on the rendered, scaled and centred
//! canvas) and model space (pixel indices of the original mask buffer).
//! Everything here is a pure function of the current transform, extracted
//! for testability.

use crate::constants::zoom;

/// Model coordinates this close to a whole pixel are treated as that pixel.
/// Absorbs float error from repeated view/model round trips.
const PIXEL_SNAP: f32 = 1e-3;

fn snap(model: f32) -> f32 {
    let nearest = model.round();
    if (model - nearest).abs() < PIXEL_SNAP {
        nearest
    } else {
        model
    }
}

/// Size of the drawing canvas in view pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A canvas that has not been laid out yet reports 0 or 1 pixels.
    pub fn is_laid_out(&self) -> bool {
        self.width > 1 && self.height > 1
    }
}

/// Clamp a user zoom multiplier to the supported range.
pub fn clamp_zoom(value: f32) -> f32 {
    value.clamp(zoom::MIN, zoom::MAX)
}

/// Represents the fit/zoom/centre transform of one image on one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// View pixels per model pixel (fit ratio times user zoom)
    pub scale: f32,
    /// Left edge of the rendered image on the canvas
    pub offset_x: i32,
    /// Top edge of the rendered image on the canvas
    pub offset_y: i32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub image_width: u32,
    pub image_height: u32,
}

impl ViewTransform {
    /// Fit an image into a canvas, apply the zoom multiplier and centre it.
    ///
    /// The offset is floored at 0, so an image zoomed larger than the
    /// canvas is anchored to the top-left corner.
    pub fn fit(image_width: u32, image_height: u32, canvas: CanvasSize, zoom_factor: f32) -> Self {
        // Loaded images are never empty, but keep the division safe anyway.
        let img_w = image_width.max(1) as f32;
        let img_h = image_height.max(1) as f32;
        let canvas_w = canvas.width.max(1);
        let canvas_h = canvas.height.max(1);

        let fit_ratio = (canvas_w as f32 / img_w).min(canvas_h as f32 / img_h);
        let scale = fit_ratio * clamp_zoom(zoom_factor);

        let scaled_w = (img_w * scale) as i64;
        let scaled_h = (img_h * scale) as i64;
        let offset_x = ((i64::from(canvas_w) - scaled_w) / 2).max(0) as i32;
        let offset_y = ((i64::from(canvas_h) - scaled_h) / 2).max(0) as i32;

        Self {
            scale,
            offset_x,
            offset_y,
            canvas_width: canvas_w,
            canvas_height: canvas_h,
            image_width,
            image_height,
        }
    }

    /// Like [`ViewTransform::fit`], but uses `fallback` when the canvas has
    /// not been laid out yet.
    pub fn fit_or_fallback(
        image_width: u32,
        image_height: u32,
        canvas: CanvasSize,
        fallback: CanvasSize,
        zoom_factor: f32,
    ) -> Self {
        let canvas = if canvas.is_laid_out() {
            canvas
        } else {
            log::debug!(
                "Canvas not laid out ({}x{}), using fallback {}x{}",
                canvas.width,
                canvas.height,
                fallback.width,
                fallback.height
            );
            fallback
        };
        Self::fit(image_width, image_height, canvas, zoom_factor)
    }

    /// Size of the rendered image in view pixels.
    pub fn scaled_size(&self) -> (u32, u32) {
        (
            (self.image_width as f32 * self.scale) as u32,
            (self.image_height as f32 * self.scale) as u32,
        )
    }

    /// Convert a view-space point to model-space pixel indices.
    ///
    /// Truncates towards zero and clamps into the image bounds.
    pub fn to_model(&self, view_x: f32, view_y: f32) -> (u32, u32) {
        let (mx, my) = self.to_model_exact(view_x, view_y);
        let x = mx.trunc() as i64;
        let y = my.trunc() as i64;
        let max_x = i64::from(self.image_width.saturating_sub(1));
        let max_y = i64::from(self.image_height.saturating_sub(1));
        (x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32)
    }

    /// Convert model-space pixel indices to a view-space point.
    pub fn to_view(&self, model_x: u32, model_y: u32) -> (i32, i32) {
        (
            (model_x as f32 * self.scale) as i32 + self.offset_x,
            (model_y as f32 * self.scale) as i32 + self.offset_y,
        )
    }

    /// Check whether a view-space point lies over the rendered image.
    pub fn contains_view(&self, view_x: f32, view_y: f32) -> bool {
        let (w, h) = self.scaled_size();
        let left = self.offset_x as f32;
        let top = self.offset_y as f32;
        view_x >= left && view_y >= top && view_x < left + w as f32 && view_y < top + h as f32
    }

    /// Unrounded model position of a view-space point. Not clamped.
    pub fn to_model_exact(&self, view_x: f32, view_y: f32) -> (f32, f32) {
        (
            snap((view_x - self.offset_x as f32) / self.scale),
            snap((view_y - self.offset_y as f32) / self.scale),
        )
    }

    /// View position of an unrounded model position.
    pub fn to_view_exact(&self, model_x: f32, model_y: f32) -> (f32, f32) {
        (
            model_x * self.scale + self.offset_x as f32,
            model_y * self.scale + self.offset_y as f32,
        )
    }

    /// Move a view-space point drawn under `self` to where the same model
    /// position appears under `next`. No rounding happens in between, so
    /// any sequence of transforms that returns to `self` returns the point.
    pub fn reproject(&self, next: &ViewTransform, view_x: f32, view_y: f32) -> (f32, f32) {
        let (mx, my) = self.to_model_exact(view_x, view_y);
        next.to_view_exact(mx, my)
    }
}
