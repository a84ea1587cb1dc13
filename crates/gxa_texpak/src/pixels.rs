//! Decoded pixel buffers and the image decoding seam.
//!
//! The converters never touch PNG files directly. They work on a
//! [`PixelBuffer`]: one packed `0xAARRGGBB` value per pixel, row-major, with a
//! stride equal to the decoded width. An [`ImageLoader`] turns files into
//! buffers; [`PngLoader`] is the default, backed by the `image` crate.

use camino::{Utf8Path, Utf8PathBuf};
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// Source pixel layout, as detected by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 24-bit RGB without an alpha channel. The packed alpha byte is meaningless.
    Rgb24,
    /// 32-bit RGBA.
    Argb32,
}

impl PixelLayout {
    /// Human readable tag for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            PixelLayout::Rgb24 => "24-bit RGB",
            PixelLayout::Argb32 => "32-bit RGBA",
        }
    }
}

/// A decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    /// `width * height` packed `0xAARRGGBB` pixels.
    pub pixels: Vec<u32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, layout: PixelLayout, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            layout,
            pixels,
        }
    }

    pub fn from_rgb8(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| pack_argb(0xFF, p[0], p[1], p[2]))
            .collect();
        Self::new(image.width(), image.height(), PixelLayout::Rgb24, pixels)
    }

    pub fn from_rgba8(image: &RgbaImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| pack_argb(p[3], p[0], p[1], p[2]))
            .collect();
        Self::new(image.width(), image.height(), PixelLayout::Argb32, pixels)
    }

    /// Packed pixel at `(x, y)`, indexed with the decoded width as stride.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    u32::from_be_bytes([a, r, g, b])
}

/// Split a packed pixel into `[a, r, g, b]`.
#[inline]
pub fn unpack_argb(pixel: u32) -> [u8; 4] {
    pixel.to_be_bytes()
}

/// Decodes image files into [`PixelBuffer`]s.
///
/// Implementations must be shareable across threads so conversion can run in
/// parallel.
pub trait ImageLoader: Send + Sync {
    /// Decode a primary texture, preserving whether it is 24-bit or 32-bit.
    ///
    /// Fails with [`Error::UnsupportedPixelFormat`] for any other layout.
    fn load(&self, path: &Utf8Path) -> Result<PixelBuffer>;

    /// Decode any image and expand it to 32-bit. Used for alpha masks and
    /// banner icons, whose source layout does not matter.
    fn load_rgba(&self, path: &Utf8Path) -> Result<PixelBuffer>;
}

/// [`ImageLoader`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngLoader;

impl ImageLoader for PngLoader {
    fn load(&self, path: &Utf8Path) -> Result<PixelBuffer> {
        match image::open(path.as_std_path())? {
            DynamicImage::ImageRgb8(rgb) => Ok(PixelBuffer::from_rgb8(&rgb)),
            DynamicImage::ImageRgba8(rgba) => Ok(PixelBuffer::from_rgba8(&rgba)),
            other => Err(Error::UnsupportedPixelFormat {
                path: Utf8PathBuf::from(path),
                color_type: format!("{:?}", other.color()),
            }),
        }
    }

    fn load_rgba(&self, path: &Utf8Path) -> Result<PixelBuffer> {
        let image = image::open(path.as_std_path())?.to_rgba8();
        Ok(PixelBuffer::from_rgba8(&image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, Rgba};

    #[test]
    fn packs_channels_in_argb_order() {
        assert_eq!(pack_argb(0x11, 0x22, 0x33, 0x44), 0x11223344);
        assert_eq!(unpack_argb(0x11223344), [0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn png_loader_detects_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();

        let rgb_path = root.join("rgb.png");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])).save(&rgb_path).unwrap();
        let rgba_path = root.join("rgba.png");
        RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4]))
            .save(&rgba_path)
            .unwrap();
        let gray_path = root.join("gray.png");
        GrayImage::from_pixel(4, 4, Luma([9])).save(&gray_path).unwrap();

        let rgb = PngLoader.load(&rgb_path).unwrap();
        assert_eq!(rgb.layout, PixelLayout::Rgb24);
        assert_eq!(rgb.pixel(3, 3), 0xFF010203);

        let rgba = PngLoader.load(&rgba_path).unwrap();
        assert_eq!(rgba.layout, PixelLayout::Argb32);
        assert_eq!(rgba.pixel(0, 0), 0x04010203);

        assert!(matches!(
            PngLoader.load(&gray_path),
            Err(Error::UnsupportedPixelFormat { .. })
        ));

        // Alpha masks may be grayscale; every channel carries the gray level.
        let gray = PngLoader.load_rgba(&gray_path).unwrap();
        assert_eq!(gray.pixel(1, 2), 0xFF090909);
    }
}
