//! Pixel-level mask mutations.
//!
//! All operations are synchronous and bounded by the buffer size. They
//! never touch the undo history; the session pushes a snapshot before
//! calling any of them.

use image::imageops;
use imageproc::distance_transform::Norm;
use imageproc::morphology;

use crate::constants::clean;
use crate::mask::{MASK_OFF, MaskBuffer, MaskColor};
use crate::model::{ModelRect, SelectionRaster};

/// Paint a filled disc of `radius` around `center`.
pub fn stamp(mask: &mut MaskBuffer, center: (u32, u32), radius: u32, color: MaskColor) {
    stroke(mask, center, center, radius, color);
}

/// Paint a capsule of `radius` from `from` to `to`: every pixel whose
/// distance to the segment is at most `radius`.
pub fn stroke(
    mask: &mut MaskBuffer,
    from: (u32, u32),
    to: (u32, u32),
    radius: u32,
    color: MaskColor,
) {
    let r = i64::from(radius);
    let (x1, y1) = (i64::from(from.0), i64::from(from.1));
    let (x2, y2) = (i64::from(to.0), i64::from(to.1));
    let max_x = i64::from(mask.width()) - 1;
    let max_y = i64::from(mask.height()) - 1;

    let left = (x1.min(x2) - r).max(0);
    let right = (x1.max(x2) + r).min(max_x);
    let top = (y1.min(y2) - r).max(0);
    let bottom = (y1.max(y2) + r).min(max_y);

    let dx = (x2 - x1) as f64;
    let dy = (y2 - y1) as f64;
    let len_sq = dx * dx + dy * dy;
    let r_sq = (r * r) as f64;

    for y in top..=bottom {
        for x in left..=right {
            let px = (x - x1) as f64;
            let py = (y - y1) as f64;
            let t = if len_sq == 0.0 {
                0.0
            } else {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            };
            let ex = px - t * dx;
            let ey = py - t * dy;
            if ex * ex + ey * ey <= r_sq {
                mask.set(x as u32, y as u32, color);
            }
        }
    }
}

/// Fill the selected region with `color`, touching only pixels of the
/// opposite colour. Returns the number of pixels changed.
pub fn fill_selection(mask: &mut MaskBuffer, region: &SelectionRaster, color: MaskColor) -> usize {
    let target = color.opposite().value();
    let mut changed = 0;
    for (x, y) in region.selected_pixels() {
        if mask.get(x, y) == target {
            mask.set(x, y, color);
            changed += 1;
        }
    }
    changed
}

/// Clear every pixel in the selected region. Returns the number of pixels
/// that were set before.
pub fn delete_selection(mask: &mut MaskBuffer, region: &SelectionRaster) -> usize {
    let mut changed = 0;
    for (x, y) in region.selected_pixels() {
        if mask.get(x, y) != MASK_OFF {
            mask.set(x, y, MaskColor::Black);
            changed += 1;
        }
    }
    changed
}

/// Swap foreground and background across the whole buffer.
pub fn invert(mask: &mut MaskBuffer) {
    imageops::invert(mask.gray_mut());
}

/// Coerce a cleanup kernel size to an odd value in `3..=21`.
pub fn normalize_kernel_size(kernel_size: u32) -> u32 {
    let k = kernel_size.clamp(clean::MIN_KERNEL, clean::MAX_KERNEL);
    if k % 2 == 0 { k + 1 } else { k }
}

/// Area a noise cleanup is restricted to.
#[derive(Debug, Clone, Copy)]
pub enum CleanScope<'a> {
    /// The whole buffer
    Whole,
    /// A rectangle, filtered as if it were its own image
    Rect(ModelRect),
    /// An arbitrary region: filter everything, keep results inside only
    Region(&'a SelectionRaster),
}

/// Morphological opening followed by closing with a square kernel.
///
/// Returns the kernel size actually used.
pub fn clean_noise(mask: &mut MaskBuffer, kernel_size: u32, scope: CleanScope<'_>) -> u32 {
    let kernel = normalize_kernel_size(kernel_size);
    if kernel != kernel_size {
        log::debug!("Clean noise kernel {} coerced to {}", kernel_size, kernel);
    }
    // A square of side 2k+1 is the L-infinity ball of radius k
    let k = ((kernel - 1) / 2) as u8;
    let open_close = |img: &image::GrayImage| {
        let opened = morphology::open(img, Norm::LInf, k);
        morphology::close(&opened, Norm::LInf, k)
    };

    match scope {
        CleanScope::Whole => {
            let cleaned = open_close(mask.as_gray());
            mask.replace_gray(cleaned);
        }
        CleanScope::Rect(rect) => {
            let rect = rect.clipped(mask.width(), mask.height());
            if rect.is_empty() {
                return kernel;
            }
            let region =
                imageops::crop_imm(mask.as_gray(), rect.x, rect.y, rect.width, rect.height)
                    .to_image();
            let cleaned = open_close(&region);
            imageops::replace(
                mask.gray_mut(),
                &cleaned,
                i64::from(rect.x),
                i64::from(rect.y),
            );
        }
        CleanScope::Region(region) => {
            let cleaned = open_close(mask.as_gray());
            for (x, y) in region.selected_pixels() {
                let value = cleaned.get_pixel(x, y).0[0];
                mask.gray_mut().get_pixel_mut(x, y).0[0] = value;
            }
        }
    }
    kernel
}

/// 4-connected flood fill from `seed` over pixels within `tolerance` of the
/// seed's original value. Returns the number of pixels filled.
pub fn flood_fill(mask: &mut MaskBuffer, seed: (u32, u32), color: MaskColor, tolerance: u8) -> usize {
    let (width, height) = mask.dimensions();
    if seed.0 >= width || seed.1 >= height {
        return 0;
    }
    let original = mask.get(seed.0, seed.1);
    if original == color.value() {
        return 0;
    }

    let in_range = |v: u8| original.abs_diff(v) <= tolerance;
    let idx = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut visited = vec![false; width as usize * height as usize];
    let mut stack = vec![seed];
    visited[idx(seed.0, seed.1)] = true;
    let mut filled = 0;

    while let Some((x, y)) = stack.pop() {
        mask.set(x, y, color);
        filled += 1;

        let mut neighbours = [None; 4];
        if x > 0 {
            neighbours[0] = Some((x - 1, y));
        }
        if x + 1 < width {
            neighbours[1] = Some((x + 1, y));
        }
        if y > 0 {
            neighbours[2] = Some((x, y - 1));
        }
        if y + 1 < height {
            neighbours[3] = Some((x, y + 1));
        }

        for (nx, ny) in neighbours.into_iter().flatten() {
            let i = idx(nx, ny);
            if !visited[i] && in_range(mask.get(nx, ny)) {
                visited[i] = true;
                stack.push((nx, ny));
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MASK_ON;

    fn blank(w: u32, h: u32) -> MaskBuffer {
        MaskBuffer::blank(w, h).unwrap()
    }

    fn white(w: u32, h: u32) -> MaskBuffer {
        let mut m = blank(w, h);
        invert(&mut m);
        m
    }

    #[test]
    fn test_stamp_disc_area() {
        let mut mask = blank(100, 100);
        stamp(&mut mask, (50, 50), 10, MaskColor::White);
        // Lattice points with x^2 + y^2 <= 100
        assert_eq!(mask.count_on(), 317);
        assert_eq!(mask.get(50, 50), MASK_ON);
        assert_eq!(mask.get(60, 50), MASK_ON);
        assert_eq!(mask.get(61, 50), MASK_OFF);
        assert_eq!(mask.get(58, 58), MASK_OFF);
    }

    #[test]
    fn test_stamp_clipped_at_edge() {
        let mut mask = blank(20, 20);
        stamp(&mut mask, (0, 0), 3, MaskColor::White);
        assert!(mask.count_on() > 0);
        assert!(mask.is_binary());
    }

    #[test]
    fn test_stroke_is_capsule_without_gaps() {
        let mut mask = blank(100, 20);
        stroke(&mut mask, (10, 10), (90, 10), 2, MaskColor::White);
        for x in 10..=90 {
            for y in 8..=12 {
                assert_eq!(mask.get(x, y), MASK_ON, "gap at ({}, {})", x, y);
            }
        }
        // Rounded caps
        assert_eq!(mask.get(8, 10), MASK_ON);
        assert_eq!(mask.get(8, 8), MASK_OFF);
        assert_eq!(mask.get(50, 13), MASK_OFF);
    }

    #[test]
    fn test_stroke_black_erases() {
        let mut mask = white(30, 30);
        stroke(&mut mask, (5, 5), (25, 25), 1, MaskColor::Black);
        assert_eq!(mask.get(15, 15), MASK_OFF);
        assert_eq!(mask.get(25, 5), MASK_ON);
    }

    #[test]
    fn test_fill_changes_only_opposite_pixels_inside() {
        let mut mask = blank(40, 40);
        stamp(&mut mask, (20, 20), 3, MaskColor::White);
        let before = mask.clone();
        let region = SelectionRaster::from_rect(&ModelRect::new(10, 10, 20, 20), 40, 40);

        let changed = fill_selection(&mut mask, &region, MaskColor::White);
        assert_eq!(changed, 400 - before.count_on());
        for y in 0..40 {
            for x in 0..40 {
                if region.contains(x, y) {
                    assert_eq!(mask.get(x, y), MASK_ON);
                } else {
                    assert_eq!(mask.get(x, y), before.get(x, y));
                }
            }
        }
    }

    #[test]
    fn test_fill_black_on_white() {
        let mut mask = white(50, 50);
        let region = SelectionRaster::from_rect(&ModelRect::new(10, 10, 20, 20), 50, 50);
        fill_selection(&mut mask, &region, MaskColor::Black);
        assert_eq!(mask.count_on(), 2500 - 400);
        assert_eq!(mask.get(10, 10), MASK_OFF);
        assert_eq!(mask.get(29, 29), MASK_OFF);
        assert_eq!(mask.get(30, 30), MASK_ON);
    }

    #[test]
    fn test_delete_clears_region() {
        let mut mask = white(20, 20);
        let region = SelectionRaster::from_polygon(&[(0, 0), (10, 0), (10, 10), (0, 10)], 20, 20);
        let cleared = delete_selection(&mut mask, &region);
        assert_eq!(cleared, 100);
        assert_eq!(mask.count_on(), 300);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let mut mask = blank(30, 30);
        stamp(&mut mask, (10, 12), 4, MaskColor::White);
        let original = mask.clone();
        invert(&mut mask);
        assert_eq!(mask.count_on(), 900 - original.count_on());
        invert(&mut mask);
        assert_eq!(mask, original);
    }

    #[test]
    fn test_kernel_size_coercion() {
        assert_eq!(normalize_kernel_size(4), 5);
        assert_eq!(normalize_kernel_size(5), 5);
        assert_eq!(normalize_kernel_size(0), 3);
        assert_eq!(normalize_kernel_size(20), 21);
        assert_eq!(normalize_kernel_size(100), 21);
    }

    #[test]
    fn test_clean_removes_specks_and_fills_holes() {
        let mut mask = blank(60, 60);
        // Solid block with a one-pixel hole, plus an isolated speck
        fill_selection(
            &mut mask,
            &SelectionRaster::from_rect(&ModelRect::new(20, 20, 20, 20), 60, 60),
            MaskColor::White,
        );
        mask.set(30, 30, MaskColor::Black);
        mask.set(5, 5, MaskColor::White);

        let used = clean_noise(&mut mask, 4, CleanScope::Whole);
        assert_eq!(used, 5);
        assert_eq!(mask.get(5, 5), MASK_OFF);
        assert_eq!(mask.get(30, 30), MASK_ON);
        assert_eq!(mask.get(25, 25), MASK_ON);
        assert!(mask.is_binary());
    }

    #[test]
    fn test_clean_region_leaves_outside_untouched() {
        let mut mask = blank(60, 60);
        mask.set(5, 5, MaskColor::White);
        mask.set(50, 50, MaskColor::White);
        let region = SelectionRaster::from_rect(&ModelRect::new(0, 0, 20, 20), 60, 60);

        clean_noise(&mut mask, 3, CleanScope::Region(&region));
        assert_eq!(mask.get(5, 5), MASK_OFF);
        assert_eq!(mask.get(50, 50), MASK_ON);
    }

    #[test]
    fn test_clean_rect_leaves_outside_untouched() {
        let mut mask = blank(60, 60);
        mask.set(5, 5, MaskColor::White);
        mask.set(50, 50, MaskColor::White);

        clean_noise(&mut mask, 3, CleanScope::Rect(ModelRect::new(0, 0, 20, 20)));
        assert_eq!(mask.get(5, 5), MASK_OFF);
        assert_eq!(mask.get(50, 50), MASK_ON);

        // Empty rectangles are a no-op
        clean_noise(&mut mask, 3, CleanScope::Rect(ModelRect::new(40, 40, 0, 10)));
        assert_eq!(mask.get(50, 50), MASK_ON);
    }

    #[test]
    fn test_flood_fill_bounded_by_walls() {
        let mut mask = blank(20, 20);
        // Vertical wall at x = 10
        stroke(&mut mask, (10, 0), (10, 19), 0, MaskColor::White);
        let filled = flood_fill(&mut mask, (2, 2), MaskColor::White, 5);
        assert_eq!(filled, 10 * 20);
        assert_eq!(mask.get(0, 19), MASK_ON);
        assert_eq!(mask.get(11, 0), MASK_OFF);
    }

    #[test]
    fn test_flood_fill_is_four_connected() {
        let mut mask = blank(3, 3);
        // Diagonal wall: the corner pixel (0, 0) is reachable only diagonally
        mask.set(1, 0, MaskColor::White);
        mask.set(0, 1, MaskColor::White);
        let filled = flood_fill(&mut mask, (2, 2), MaskColor::White, 5);
        assert_eq!(filled, 6);
        assert_eq!(mask.get(0, 0), MASK_OFF);
    }

    #[test]
    fn test_flood_fill_noop_on_same_color() {
        let mut mask = white(5, 5);
        assert_eq!(flood_fill(&mut mask, (1, 1), MaskColor::White, 5), 0);
        assert_eq!(flood_fill(&mut mask, (9, 9), MaskColor::Black, 5), 0);
        assert_eq!(mask.count_on(), 25);
    }
}
