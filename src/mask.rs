//! Raster buffers owned by an editing session.
//!
//! [`MaskBuffer`] is the single-channel 0/255 mask being edited and
//! [`ImageBuffer`] the read-only photo it is painted over.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::constants::threshold;
use crate::error::{EditorError, Result};

/// Value of a masked (foreground) pixel.
pub const MASK_ON: u8 = 255;
/// Value of an unmasked (background) pixel.
pub const MASK_OFF: u8 = 0;

/// The two values a mask pixel may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaskColor {
    /// Foreground (255)
    #[default]
    White,
    /// Background (0)
    Black,
}

impl MaskColor {
    /// Raw pixel value of this colour.
    pub fn value(self) -> u8 {
        match self {
            MaskColor::White => MASK_ON,
            MaskColor::Black => MASK_OFF,
        }
    }

    /// The other colour.
    pub fn opposite(self) -> Self {
        match self {
            MaskColor::White => MaskColor::Black,
            MaskColor::Black => MaskColor::White,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MaskColor::White => "White",
            MaskColor::Black => "Black",
        }
    }
}

/// Binary mask raster. Every pixel is either [`MASK_OFF`] or [`MASK_ON`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskBuffer {
    pixels: GrayImage,
}

impl MaskBuffer {
    /// Allocate an all-zero mask.
    ///
    /// Allocation failure is reported as [`EditorError::Allocation`] instead
    /// of aborting, so the caller can drop the image that needed it.
    pub fn blank(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EditorError::empty_image(width, height));
        }
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .ok_or(EditorError::Allocation { bytes: usize::MAX })?;

        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| EditorError::Allocation { bytes })?;
        data.resize(bytes, MASK_OFF);

        let pixels =
            GrayImage::from_raw(width, height, data).ok_or(EditorError::Allocation { bytes })?;
        Ok(Self { pixels })
    }

    /// Build a mask from an arbitrary greyscale raster.
    ///
    /// The raster is resampled (bilinear) to `width`x`height` if its size
    /// differs, then thresholded so values above 127 become 255.
    pub fn from_gray(gray: GrayImage, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EditorError::empty_image(width, height));
        }
        let mut pixels = if gray.dimensions() == (width, height) {
            gray
        } else {
            log::info!(
                "Resizing mask from {}x{} to image size {}x{}",
                gray.width(),
                gray.height(),
                width,
                height
            );
            image::imageops::resize(&gray, width, height, FilterType::Triangle)
        };

        for p in pixels.pixels_mut() {
            p.0[0] = if p.0[0] > threshold::MASK_BINARY {
                MASK_ON
            } else {
                MASK_OFF
            };
        }
        Ok(Self { pixels })
    }

    /// Decode an encoded mask file (any format the `image` crate reads).
    pub fn decode(bytes: &[u8], width: u32, height: u32) -> Result<Self> {
        let gray = image::load_from_memory(bytes)?.to_luma8();
        Self::from_gray(gray, width, height)
    }

    /// Load a mask file from disk.
    pub fn load(path: &Path, width: u32, height: u32) -> Result<Self> {
        let gray = image::open(path)?.to_luma8();
        log::debug!("Loaded mask {:?} ({}x{})", path, gray.width(), gray.height());
        Self::from_gray(gray, width, height)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Pixel value at (x, y). Panics when out of bounds, like `GrayImage`.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels.get_pixel(x, y).0[0]
    }

    /// Set one pixel.
    pub fn set(&mut self, x: u32, y: u32, color: MaskColor) {
        self.pixels.get_pixel_mut(x, y).0[0] = color.value();
    }

    /// Borrow the underlying raster.
    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    pub(crate) fn gray_mut(&mut self) -> &mut GrayImage {
        &mut self.pixels
    }

    /// Replace the raster wholesale with an already-binary one.
    pub(crate) fn replace_gray(&mut self, pixels: GrayImage) {
        debug_assert_eq!(pixels.dimensions(), self.pixels.dimensions());
        self.pixels = pixels;
    }

    /// Raw bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Copy of the raster for the caller to encode.
    pub fn export(&self) -> GrayImage {
        self.pixels.clone()
    }

    /// Encode as PNG at `path`.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixels.save_with_format(path, image::ImageFormat::Png)?;
        log::debug!("Saved mask to {:?}", path);
        Ok(())
    }

    /// Number of foreground pixels.
    pub fn count_on(&self) -> usize {
        self.as_raw().iter().filter(|&&v| v == MASK_ON).count()
    }

    /// Check that every pixel is 0 or 255.
    pub fn is_binary(&self) -> bool {
        self.as_raw().iter().all(|&v| v == MASK_ON || v == MASK_OFF)
    }
}

/// Three-channel photo the mask is drawn over. Never mutated by the editor.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pixels: RgbImage,
}

impl ImageBuffer {
    /// Wrap an RGB raster, rejecting empty images.
    pub fn from_rgb(pixels: RgbImage) -> Result<Self> {
        let (w, h) = pixels.dimensions();
        if w == 0 || h == 0 {
            return Err(EditorError::empty_image(w, h));
        }
        Ok(Self { pixels })
    }

    /// Convert any decoded image to RGB.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        Self::from_rgb(image.to_rgb8())
    }

    /// Decode an encoded image file.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_dynamic(image::load_from_memory(bytes)?)
    }

    /// Load an image file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)?;
        log::debug!("Loaded image {:?} ({}x{})", path, image.width(), image.height());
        Self::from_dynamic(image)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }
}
