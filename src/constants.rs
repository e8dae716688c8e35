//! Global constants for the mask editor.
//!
//! Tool feel (hit radii, zoom steps, flood tolerance) is tuned by hand;
//! changing any of these changes how the tools respond to the pointer.

/// Brush size limits, in model pixels.
pub mod brush {
    /// Smallest allowed brush radius
    pub const MIN_SIZE: u32 = 1;
    /// Largest allowed brush radius
    pub const MAX_SIZE: u32 = 50;
    /// Brush radius used for a fresh session
    pub const DEFAULT_SIZE: u32 = 10;
}

/// Zoom multiplier limits and step factors.
pub mod zoom {
    /// Minimum user zoom multiplier
    pub const MIN: f32 = 0.1;
    /// Maximum user zoom multiplier
    pub const MAX: f32 = 10.0;
    /// Factor applied per scroll step towards the viewer
    pub const SCROLL_IN: f32 = 1.1;
    /// Factor applied per scroll step away from the viewer
    pub const SCROLL_OUT: f32 = 0.9;
    /// Factor for the "zoom in" command
    pub const STEP_IN: f32 = 1.2;
    /// Factor for the "zoom out" command
    pub const STEP_OUT: f32 = 0.8;
}

/// Polygon selection geometry, in view pixels.
pub mod polygon {
    /// Per-axis distance for grabbing an existing vertex
    pub const VERTEX_HIT_RADIUS: f32 = 15.0;
    /// Euclidean distance to the first vertex that closes the polygon
    pub const CLOSE_RADIUS: f32 = 20.0;
    /// Minimum number of vertices before the polygon may close
    pub const MIN_VERTICES: usize = 3;
    /// Radius of the vertex markers drawn on the canvas
    pub const MARKER_RADIUS: i32 = 5;
}

/// Morphological cleanup kernel limits.
pub mod clean {
    /// Smallest kernel size (always odd)
    pub const MIN_KERNEL: u32 = 3;
    /// Largest kernel size (always odd)
    pub const MAX_KERNEL: u32 = 21;
    /// Kernel size offered by default
    pub const DEFAULT_KERNEL: u32 = 5;
}

/// Flood fill parameters.
pub mod flood {
    /// Allowed difference from the seed value (both directions)
    pub const TOLERANCE: u8 = 5;
}

/// Mask overlay appearance.
pub mod overlay {
    /// Overlay colour for mask pixels (dark blue)
    pub const COLOR: [u8; 3] = [0, 0, 180];
    /// Overlay strength for a fresh session
    pub const DEFAULT_ALPHA: f32 = 0.5;
    /// Discrete overlay strengths offered to the user
    pub const PRESETS: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];
    /// Background shown around the image on the canvas
    pub const CANVAS_BACKGROUND: [u8; 3] = [64, 64, 64];
}

/// Mask binarisation.
pub mod threshold {
    /// Grey values strictly above this become 255 on load
    pub const MASK_BINARY: u8 = 127;
}

/// Canvas sizing.
pub mod canvas {
    /// Canvas width assumed before the real canvas is laid out
    pub const FALLBACK_WIDTH: u32 = 1024;
    /// Canvas height assumed before the real canvas is laid out
    pub const FALLBACK_HEIGHT: u32 = 768;
}

/// Colours of selection and tool decorations.
pub mod decoration {
    /// Selection outlines and polygon edges
    pub const OUTLINE: [u8; 3] = [255, 255, 0];
    /// First polygon vertex (the close target)
    pub const FIRST_VERTEX: [u8; 3] = [0, 255, 0];
    /// Other polygon vertices
    pub const VERTEX: [u8; 3] = [255, 0, 0];
    /// Rubber-band and line previews
    pub const PREVIEW: [u8; 3] = [0, 255, 255];
    /// Brush footprint under the cursor
    pub const BRUSH: [u8; 3] = [160, 160, 160];
    /// Extra radius of the ring around a hovered vertex
    pub const HOVER_RING: i32 = 3;
}
