//! Selection geometry: rectangles, polygons and their rasterised form.

use image::{GrayImage, Luma};

use crate::constants::polygon::{CLOSE_RADIUS, MIN_VERTICES, VERTEX_HIT_RADIUS};
use crate::mask::{MASK_OFF, MASK_ON};
use crate::view_transform::ViewTransform;

/// A point on the canvas, in view pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &ViewPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle in model space. Covers `x..x + width` by
/// `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ModelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalised rectangle from two corner pixels.
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        let x = a.0.min(b.0);
        let y = a.1.min(b.1);
        Self {
            x,
            y,
            width: a.0.max(b.0) - x,
            height: a.1.max(b.1) - y,
        }
    }

    /// Restrict the rectangle to a `width`x`height` buffer.
    pub fn clipped(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A polygon selection whose vertices live in view space while it is
/// being edited.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    vertices: Vec<ViewPoint>,
    closed: bool,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[ViewPoint] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Append a vertex. Ignored once the polygon is closed.
    pub fn push(&mut self, point: ViewPoint) {
        if !self.closed {
            self.vertices.push(point);
        }
    }

    /// Whether the polygon has enough vertices and is still open.
    pub fn can_close(&self) -> bool {
        !self.closed && self.vertices.len() >= MIN_VERTICES
    }

    /// Close the polygon. Returns false if it cannot close yet.
    pub fn close(&mut self) -> bool {
        if !self.can_close() {
            return false;
        }
        self.closed = true;
        true
    }

    /// Index of the first vertex within the per-axis hit radius of `point`.
    pub fn hit_vertex(&self, point: ViewPoint) -> Option<usize> {
        self.vertices.iter().position(|v| {
            (point.x - v.x).abs() < VERTEX_HIT_RADIUS && (point.y - v.y).abs() < VERTEX_HIT_RADIUS
        })
    }

    /// Whether a click at `point` would close the polygon.
    pub fn is_near_first_vertex(&self, point: ViewPoint) -> bool {
        self.can_close() && self.vertices[0].distance_to(&point) < CLOSE_RADIUS
    }

    /// Move an existing vertex. Out-of-range indices are ignored.
    pub fn move_vertex(&mut self, index: usize, point: ViewPoint) {
        if let Some(v) = self.vertices.get_mut(index) {
            *v = point;
        }
    }

    /// Edges as view-space segments, including the closing edge when closed.
    pub fn edges(&self) -> Vec<(ViewPoint, ViewPoint)> {
        let mut edges: Vec<_> = self.vertices.windows(2).map(|w| (w[0], w[1])).collect();
        if let (true, Some(&last), Some(&first)) =
            (self.closed, self.vertices.last(), self.vertices.first())
        {
            edges.push((last, first));
        }
        edges
    }

    /// Vertices converted to model space.
    pub fn model_vertices(&self, transform: &ViewTransform) -> Vec<(u32, u32)> {
        self.vertices
            .iter()
            .map(|v| transform.to_model(v.x, v.y))
            .collect()
    }

    /// Re-derive view positions after the transform changed.
    pub fn reproject(&mut self, old: &ViewTransform, new: &ViewTransform) {
        for v in &mut self.vertices {
            let (x, y) = old.reproject(new, v.x, v.y);
            *v = ViewPoint::new(x, y);
        }
    }
}

/// Rasterised selection, shaped like the mask: 255 inside, 0 outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRaster {
    pixels: GrayImage,
}

impl SelectionRaster {
    /// Rasterise a model-space rectangle.
    pub fn from_rect(rect: &ModelRect, width: u32, height: u32) -> Self {
        let rect = rect.clipped(width, height);
        let mut pixels = GrayImage::new(width, height);
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                pixels.put_pixel(x, y, Luma([MASK_ON]));
            }
        }
        Self { pixels }
    }

    /// Scan-fill a model-space polygon with the even-odd rule.
    ///
    /// A pixel is inside when its centre is inside, so an axis-aligned
    /// square from (x0, y0) to (x1, y1) covers exactly the same pixels as
    /// `ModelRect::from_corners((x0, y0), (x1, y1))`.
    pub fn from_polygon(vertices: &[(u32, u32)], width: u32, height: u32) -> Self {
        let mut pixels = GrayImage::new(width, height);
        if vertices.len() < MIN_VERTICES {
            return Self { pixels };
        }

        let points: Vec<(f32, f32)> = vertices
            .iter()
            .map(|&(x, y)| (x as f32, y as f32))
            .collect();
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

        let first_row = (min_y.floor().max(0.0)) as u32;
        let last_row = (max_y.ceil() as u32).min(height);
        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());

        for row in first_row..last_row {
            let scan_y = row as f32 + 0.5;
            crossings.clear();

            let mut j = points.len() - 1;
            for i in 0..points.len() {
                let (xi, yi) = points[i];
                let (xj, yj) = points[j];
                if (yi <= scan_y) != (yj <= scan_y) {
                    crossings.push(xi + (scan_y - yi) * (xj - xi) / (yj - yi));
                }
                j = i;
            }
            crossings.sort_by(f32::total_cmp);

            for span in crossings.chunks_exact(2) {
                // Pixel centres px + 0.5 in [span[0], span[1])
                let start = (span[0] - 0.5).ceil().max(0.0) as u32;
                let end = ((span[1] - 0.5).ceil().max(0.0) as u32).min(width);
                for x in start..end {
                    pixels.put_pixel(x, row, Luma([MASK_ON]));
                }
            }
        }

        Self { pixels }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y).0[0] != MASK_OFF
    }

    /// Number of selected pixels.
    pub fn count(&self) -> usize {
        self.pixels.as_raw().iter().filter(|&&v| v == MASK_ON).count()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    /// Iterate over the coordinates of selected pixels.
    pub fn selected_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pixels
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] == MASK_ON)
            .map(|(x, y, _)| (x, y))
    }
}

/// The current selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    /// Rectangle in model space
    Rectangle(ModelRect),
    /// Polygon in view space, open while it is being built
    Polygon(Polygon),
}

impl Selection {
    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self {
            Selection::None => "No selection".to_string(),
            Selection::Rectangle(r) => {
                format!("Rectangle ({}, {}, {}, {})", r.x, r.y, r.width, r.height)
            }
            Selection::Polygon(p) if p.is_closed() => {
                format!("Polygon ({} vertices)", p.len())
            }
            Selection::Polygon(p) => format!("Polygon in progress ({} vertices)", p.len()),
        }
    }
}

/// Holds the selection together with its cached raster.
///
/// The raster is derived state: it exists only for rectangles and closed
/// polygons and is rebuilt whenever the geometry or the transform changes.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selection: Selection,
    raster: Option<SelectionRaster>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The rasterised selection, if it targets any region yet.
    pub fn raster(&self) -> Option<&SelectionRaster> {
        self.raster.as_ref()
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        match &self.selection {
            Selection::Polygon(p) => Some(p),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.selection = Selection::None;
        self.raster = None;
    }

    /// Replace the selection with a rectangle.
    pub fn set_rectangle(&mut self, rect: ModelRect, transform: &ViewTransform) {
        self.selection = Selection::Rectangle(rect);
        self.refresh_raster(transform);
    }

    /// Append a vertex to the open polygon, starting a new polygon if the
    /// current selection is anything else (including a closed polygon).
    pub fn push_polygon_vertex(&mut self, point: ViewPoint) {
        match &mut self.selection {
            Selection::Polygon(p) if !p.is_closed() => p.push(point),
            _ => {
                let mut polygon = Polygon::new();
                polygon.push(point);
                self.selection = Selection::Polygon(polygon);
                self.raster = None;
            }
        }
    }

    /// Mutable access to the current polygon, open or closed.
    ///
    /// Callers must call [`SelectionModel::refresh_raster`] after changing
    /// the geometry.
    pub fn polygon_mut(&mut self) -> Option<&mut Polygon> {
        match &mut self.selection {
            Selection::Polygon(p) => Some(p),
            _ => None,
        }
    }

    /// Rebuild the raster from the current geometry.
    pub fn refresh_raster(&mut self, transform: &ViewTransform) {
        let (w, h) = (transform.image_width, transform.image_height);
        self.raster = match &self.selection {
            Selection::None => None,
            Selection::Rectangle(rect) => Some(SelectionRaster::from_rect(rect, w, h)),
            Selection::Polygon(p) if p.is_closed() => Some(SelectionRaster::from_polygon(
                &p.model_vertices(transform),
                w,
                h,
            )),
            Selection::Polygon(_) => None,
        };
    }

    /// Re-project view-space geometry for a new transform and rebuild the
    /// raster.
    pub fn reproject(&mut self, old: &ViewTransform, new: &ViewTransform) {
        if let Selection::Polygon(p) = &mut self.selection {
            p.reproject(old, new);
        }
        self.refresh_raster(new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_transform::CanvasSize;

    fn identity(width: u32, height: u32) -> ViewTransform {
        ViewTransform::fit(width, height, CanvasSize::new(width, height), 1.0)
    }

    fn triangle() -> Polygon {
        let mut p = Polygon::new();
        p.push(ViewPoint::new(0.0, 0.0));
        p.push(ViewPoint::new(0.0, 50.0));
        p.push(ViewPoint::new(50.0, 50.0));
        p
    }

    #[test]
    fn test_rect_from_corners_normalises() {
        let r = ModelRect::from_corners((30, 40), (10, 5));
        assert_eq!(r, ModelRect::new(10, 5, 20, 35));
        assert!(r.contains(10, 5));
        assert!(!r.contains(30, 5));
    }

    #[test]
    fn test_rect_clipped() {
        let r = ModelRect::new(90, 90, 20, 20).clipped(100, 100);
        assert_eq!(r, ModelRect::new(90, 90, 10, 10));
    }

    #[test]
    fn test_polygon_needs_three_vertices_to_close() {
        let mut p = Polygon::new();
        p.push(ViewPoint::new(0.0, 0.0));
        p.push(ViewPoint::new(10.0, 0.0));
        assert!(!p.close());
        p.push(ViewPoint::new(10.0, 10.0));
        assert!(p.close());
        assert!(p.is_closed());
        // Closing is irrevocable and blocks new vertices
        p.push(ViewPoint::new(20.0, 20.0));
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn test_hit_vertex_is_per_axis() {
        let p = triangle();
        // 14 px away on both axes: Euclidean ~19.8, still a hit
        assert_eq!(p.hit_vertex(ViewPoint::new(14.0, 14.0)), Some(0));
        assert_eq!(p.hit_vertex(ViewPoint::new(15.0, 0.0)), None);
        assert_eq!(p.hit_vertex(ViewPoint::new(45.0, 52.0)), Some(2));
    }

    #[test]
    fn test_close_detection_is_euclidean() {
        let p = triangle();
        assert!(p.is_near_first_vertex(ViewPoint::new(2.0, 2.0)));
        assert!(p.is_near_first_vertex(ViewPoint::new(19.0, 0.0)));
        // Within 15 per axis but 21.2 px away
        assert!(!p.is_near_first_vertex(ViewPoint::new(15.0, 15.0)));
    }

    #[test]
    fn test_edges_include_closing_edge() {
        let mut p = triangle();
        assert_eq!(p.edges().len(), 2);
        p.close();
        let edges = p.edges();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2].1, ViewPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_square_rasterises_to_its_area() {
        let square = [(10, 10), (10, 50), (50, 50), (50, 10)];
        let raster = SelectionRaster::from_polygon(&square, 100, 100);
        assert_eq!(raster.count(), 40 * 40);
        assert!(raster.contains(10, 10));
        assert!(raster.contains(49, 49));
        assert!(!raster.contains(50, 50));
        assert!(!raster.contains(9, 30));
    }

    #[test]
    fn test_square_polygon_matches_rectangle() {
        let square = [(5, 7), (25, 7), (25, 30), (5, 30)];
        let poly = SelectionRaster::from_polygon(&square, 40, 40);
        let rect = SelectionRaster::from_rect(&ModelRect::from_corners((5, 7), (25, 30)), 40, 40);
        assert_eq!(poly, rect);
    }

    #[test]
    fn test_triangle_area_within_tolerance() {
        let tri = [(0, 0), (0, 60), (60, 60)];
        let count = SelectionRaster::from_polygon(&tri, 100, 100).count() as i64;
        let expected = 60 * 60 / 2;
        assert!((count - expected).abs() <= 60, "count {}", count);
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        let raster = SelectionRaster::from_polygon(&[(1, 1), (5, 5)], 10, 10);
        assert_eq!(raster.count(), 0);
    }

    #[test]
    fn test_model_open_polygon_has_no_raster() {
        let t = identity(100, 100);
        let mut model = SelectionModel::new();
        model.push_polygon_vertex(ViewPoint::new(10.0, 10.0));
        model.push_polygon_vertex(ViewPoint::new(10.0, 40.0));
        model.push_polygon_vertex(ViewPoint::new(40.0, 40.0));
        model.refresh_raster(&t);
        assert!(model.raster().is_none());

        model.polygon_mut().unwrap().close();
        model.refresh_raster(&t);
        assert!(model.raster().unwrap().count() > 0);
    }

    #[test]
    fn test_push_after_closed_polygon_starts_new_one() {
        let t = identity(100, 100);
        let mut model = SelectionModel::new();
        for v in triangle().vertices() {
            model.push_polygon_vertex(*v);
        }
        assert!(model.polygon_mut().unwrap().close());
        model.refresh_raster(&t);
        assert!(model.raster().is_some());

        model.push_polygon_vertex(ViewPoint::new(70.0, 70.0));
        let polygon = model.polygon().unwrap();
        assert!(!polygon.is_closed());
        assert_eq!(polygon.vertices(), &[ViewPoint::new(70.0, 70.0)]);
        assert!(model.raster().is_none());
    }

    #[test]
    fn test_push_replaces_rectangle_selection() {
        let t = identity(100, 100);
        let mut model = SelectionModel::new();
        model.set_rectangle(ModelRect::new(0, 0, 10, 10), &t);
        model.push_polygon_vertex(ViewPoint::new(5.0, 5.0));
        assert_eq!(model.polygon().map(Polygon::len), Some(1));
        assert!(model.raster().is_none());
    }

    #[test]
    fn test_reproject_keeps_raster_consistent() {
        let before = identity(100, 100);
        let after = ViewTransform::fit(100, 100, CanvasSize::new(100, 100), 2.0);
        let mut model = SelectionModel::new();
        for (x, y) in [(10.0, 10.0), (10.0, 30.0), (30.0, 30.0), (30.0, 10.0)] {
            model.push_polygon_vertex(ViewPoint::new(x, y));
        }
        model.polygon_mut().unwrap().close();
        model.refresh_raster(&before);
        let raster_before = model.raster().cloned();

        model.reproject(&before, &after);
        assert_eq!(model.polygon().unwrap().vertices()[2], ViewPoint::new(60.0, 60.0));
        assert_eq!(model.raster().cloned(), raster_before);
    }

    #[test]
    fn test_rectangle_raster() {
        let t = identity(50, 50);
        let mut model = SelectionModel::new();
        model.set_rectangle(ModelRect::new(10, 10, 20, 20), &t);
        assert_eq!(model.raster().unwrap().count(), 400);
        assert_eq!(model.selection().describe(), "Rectangle (10, 10, 20, 20)");
    }
}
