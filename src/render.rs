//! Compositing of image, mask overlay and selection decorations.
//!
//! Everything here is a pure function of its inputs: rendering never
//! touches the mask, the selection or the tool state.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use serde::{Deserialize, Serialize};

use crate::constants::{decoration, overlay, polygon};
use crate::mask::{ImageBuffer, MASK_ON, MaskBuffer};
use crate::view_transform::ViewTransform;

/// What the canvas shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Image with the mask blended on top
    #[default]
    Overlay,
    /// Mask pixels in the overlay colour on white
    MaskOnly,
    /// The image alone
    ImageOnly,
}

impl ViewMode {
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Overlay => "Overlay",
            ViewMode::MaskOnly => "Mask only",
            ViewMode::ImageOnly => "Image only",
        }
    }
}

/// Composite image and mask at model resolution.
///
/// Overlay adds `alpha` times the overlay colour to every masked pixel,
/// saturating at 255.
pub fn composite(image: &ImageBuffer, mask: &MaskBuffer, alpha: f32, mode: ViewMode) -> RgbImage {
    let alpha = alpha.clamp(0.0, 1.0);
    match mode {
        ViewMode::ImageOnly => image.as_rgb().clone(),
        ViewMode::MaskOnly => {
            let (w, h) = mask.dimensions();
            RgbImage::from_fn(w, h, |x, y| {
                if mask.get(x, y) == MASK_ON {
                    Rgb(overlay::COLOR)
                } else {
                    Rgb([255, 255, 255])
                }
            })
        }
        ViewMode::Overlay => {
            let tint = overlay::COLOR.map(|c| (f32::from(c) * alpha).round() as u16);
            let mut out = image.as_rgb().clone();
            for (x, y, pixel) in out.enumerate_pixels_mut() {
                if mask.get(x, y) == MASK_ON {
                    for (channel, add) in pixel.0.iter_mut().zip(tint) {
                        *channel = (u16::from(*channel) + add).min(255) as u8;
                    }
                }
            }
            out
        }
    }
}

/// Composite and resample to the transform's on-screen size.
pub fn render_view(
    image: &ImageBuffer,
    mask: &MaskBuffer,
    alpha: f32,
    mode: ViewMode,
    transform: &ViewTransform,
) -> RgbImage {
    let composed = composite(image, mask, alpha, mode);
    let (w, h) = transform.scaled_size();
    let (w, h) = (w.max(1), h.max(1));
    if (w, h) == composed.dimensions() {
        return composed;
    }
    imageops::resize(&composed, w, h, FilterType::Lanczos3)
}

/// A view-space overlay drawn on top of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoration {
    /// Rectangle selection (committed or being dragged)
    RectOutline {
        top_left: (f32, f32),
        bottom_right: (f32, f32),
    },
    /// One polygon edge
    Edge { from: (f32, f32), to: (f32, f32) },
    /// A polygon vertex marker
    Vertex {
        at: (f32, f32),
        first: bool,
        hovered: bool,
    },
    /// Rubber band to the cursor, or the pending line stroke
    Preview { from: (f32, f32), to: (f32, f32) },
    /// Brush footprint under the cursor
    BrushFootprint { center: (f32, f32), radius: f32 },
}

/// Paint decorations onto a canvas-sized raster.
pub fn draw_decorations(canvas: &mut RgbImage, decorations: &[Decoration]) {
    for deco in decorations {
        match *deco {
            Decoration::RectOutline {
                top_left: (x0, y0),
                bottom_right: (x1, y1),
            } => {
                let color = Rgb(decoration::OUTLINE);
                draw_line_segment_mut(canvas, (x0, y0), (x1, y0), color);
                draw_line_segment_mut(canvas, (x1, y0), (x1, y1), color);
                draw_line_segment_mut(canvas, (x1, y1), (x0, y1), color);
                draw_line_segment_mut(canvas, (x0, y1), (x0, y0), color);
            }
            Decoration::Edge { from, to } => {
                draw_line_segment_mut(canvas, from, to, Rgb(decoration::OUTLINE));
            }
            Decoration::Preview { from, to } => {
                draw_line_segment_mut(canvas, from, to, Rgb(decoration::PREVIEW));
            }
            Decoration::Vertex { at, first, hovered } => {
                let center = (at.0 as i32, at.1 as i32);
                let color = if first {
                    decoration::FIRST_VERTEX
                } else {
                    decoration::VERTEX
                };
                draw_filled_circle_mut(canvas, center, polygon::MARKER_RADIUS, Rgb(color));
                if hovered {
                    draw_hollow_circle_mut(
                        canvas,
                        center,
                        polygon::MARKER_RADIUS + decoration::HOVER_RING,
                        Rgb(decoration::OUTLINE),
                    );
                }
            }
            Decoration::BrushFootprint { center, radius } => {
                let r = radius.round().max(1.0) as i32;
                draw_hollow_circle_mut(
                    canvas,
                    (center.0 as i32, center.1 as i32),
                    r,
                    Rgb(decoration::BRUSH),
                );
            }
        }
    }
}

/// Render the full canvas: background, the scaled image at the transform
/// offset, then decorations.
pub fn render_canvas(
    image: &ImageBuffer,
    mask: &MaskBuffer,
    alpha: f32,
    mode: ViewMode,
    transform: &ViewTransform,
    decorations: &[Decoration],
) -> RgbImage {
    let view = render_view(image, mask, alpha, mode, transform);
    let mut canvas = RgbImage::from_pixel(
        transform.canvas_width,
        transform.canvas_height,
        Rgb(overlay::CANVAS_BACKGROUND),
    );
    imageops::overlay(
        &mut canvas,
        &view,
        i64::from(transform.offset_x),
        i64::from(transform.offset_y),
    );
    draw_decorations(&mut canvas, decorations);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskColor;
    use crate::view_transform::CanvasSize;

    fn grey_image(w: u32, h: u32, v: u8) -> ImageBuffer {
        ImageBuffer::from_rgb(RgbImage::from_pixel(w, h, Rgb([v, v, v]))).unwrap()
    }

    fn half_mask(w: u32, h: u32) -> MaskBuffer {
        let mut m = MaskBuffer::blank(w, h).unwrap();
        for y in 0..h {
            for x in 0..w / 2 {
                m.set(x, y, MaskColor::White);
            }
        }
        m
    }

    #[test]
    fn test_overlay_adds_tint_to_masked_pixels_only() {
        let image = grey_image(4, 2, 100);
        let out = composite(&image, &half_mask(4, 2), 0.5, ViewMode::Overlay);
        assert_eq!(out.get_pixel(0, 0).0, [100, 100, 190]);
        assert_eq!(out.get_pixel(3, 0).0, [100, 100, 100]);
    }

    #[test]
    fn test_overlay_saturates() {
        let image = grey_image(2, 1, 200);
        let out = composite(&image, &half_mask(2, 1), 1.0, ViewMode::Overlay);
        assert_eq!(out.get_pixel(0, 0).0, [200, 200, 255]);
    }

    #[test]
    fn test_zero_alpha_overlay_is_image() {
        let image = grey_image(4, 4, 30);
        let out = composite(&image, &half_mask(4, 4), 0.0, ViewMode::Overlay);
        assert_eq!(&out, image.as_rgb());
    }

    #[test]
    fn test_mask_only_ignores_image() {
        let image = grey_image(4, 1, 7);
        let out = composite(&image, &half_mask(4, 1), 0.5, ViewMode::MaskOnly);
        assert_eq!(out.get_pixel(0, 0).0, overlay::COLOR);
        assert_eq!(out.get_pixel(3, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_image_only_is_unmodified() {
        let image = grey_image(3, 3, 42);
        let out = composite(&image, &half_mask(3, 3), 1.0, ViewMode::ImageOnly);
        assert_eq!(&out, image.as_rgb());
    }

    #[test]
    fn test_render_view_matches_scaled_size() {
        let image = grey_image(50, 25, 10);
        let mask = MaskBuffer::blank(50, 25).unwrap();
        let t = ViewTransform::fit(50, 25, CanvasSize::new(200, 200), 1.0);
        let view = render_view(&image, &mask, 0.5, ViewMode::Overlay, &t);
        assert_eq!(view.dimensions(), t.scaled_size());
    }

    #[test]
    fn test_render_canvas_places_image_at_offset() {
        let image = grey_image(10, 5, 120);
        let mask = MaskBuffer::blank(10, 5).unwrap();
        let t = ViewTransform::fit(10, 5, CanvasSize::new(20, 20), 1.0);
        let canvas = render_canvas(&image, &mask, 0.5, ViewMode::Overlay, &t, &[]);

        assert_eq!(canvas.dimensions(), (20, 20));
        assert_eq!(canvas.get_pixel(0, 0).0, overlay::CANVAS_BACKGROUND);
        assert_eq!(canvas.get_pixel(10, 10).0, [120, 120, 120]);
    }

    #[test]
    fn test_decorations_are_drawn() {
        let mut canvas = RgbImage::new(40, 40);
        draw_decorations(
            &mut canvas,
            &[
                Decoration::RectOutline {
                    top_left: (5.0, 5.0),
                    bottom_right: (30.0, 30.0),
                },
                Decoration::Vertex {
                    at: (20.0, 20.0),
                    first: true,
                    hovered: false,
                },
            ],
        );
        assert_eq!(canvas.get_pixel(5, 15).0, decoration::OUTLINE);
        assert_eq!(canvas.get_pixel(20, 20).0, decoration::FIRST_VERTEX);
        assert_eq!(canvas.get_pixel(15, 15).0, [0, 0, 0]);
    }
}
