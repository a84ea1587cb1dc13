//! RGBA8 texture conversion.
//!
//! The target texture format (`GX_TF_RGBA8`) stores the image as 4x4 tiles in
//! row-major tile order. Each tile is 64 bytes: sixteen big-endian `AR` words
//! (`alpha << 8 | red`) for the tile's pixels in row-major order, followed by
//! sixteen `GB` words (`green << 8 | blue`) for the same pixels.
//!
//! Rows and columns past the last multiple of 4 are dropped.

use byteorder::{WriteBytesExt, BE};

use crate::error::{Error, Result};
use crate::pixels::{unpack_argb, PixelBuffer, PixelLayout};

/// Texture format tag stored with every archive entry.
pub const GX_TF_RGBA8: u8 = 6;

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 4;

const TEXELS_PER_TILE: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Everything needed to convert one texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureSource<'a> {
    /// Display name, only used in errors.
    pub name: &'a str,
    pub primary: &'a PixelBuffer,
    /// Separate alpha mask for 24-bit sources. Its blue channel is the alpha.
    pub alpha: Option<&'a PixelBuffer>,
    pub replace_alpha_with_blue: bool,
}

/// Image dimensions rounded down to whole tiles.
pub fn tiled_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width - width % TILE_SIZE, height - height % TILE_SIZE)
}

/// Origins of every whole tile in a `width x height` image, in row-major tile order.
pub(crate) fn tile_origins(width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let (width, height) = tiled_dimensions(width, height);
    (0..height)
        .step_by(TILE_SIZE as usize)
        .flat_map(move |y| (0..width).step_by(TILE_SIZE as usize).map(move |x| (x, y)))
}

/// Pixel coordinates inside the tile at `(x, y)`, row-major.
pub(crate) fn tile_texels(x: u32, y: u32) -> impl Iterator<Item = (u32, u32)> {
    (0..TILE_SIZE).flat_map(move |row| (0..TILE_SIZE).map(move |col| (x + col, y + row)))
}

/// Convert a decoded texture to tiled RGBA8 bytes.
///
/// Alpha for 24-bit sources comes from the alpha mask when one is given, else
/// from the blue channel when `replace_alpha_with_blue` is set, else it is
/// fully opaque. 32-bit sources use their own alpha.
///
/// Pixels are addressed with the decoded width as stride, so sources whose
/// width is not a multiple of 4 lose their trailing columns rather than
/// shearing.
pub fn convert_rgba8(source: &TextureSource<'_>) -> Result<Vec<u8>> {
    let primary = source.primary;
    if let Some(alpha) = source.alpha {
        if alpha.dimensions() != primary.dimensions() {
            return Err(Error::DimensionMismatch {
                file_name: source.name.to_string(),
                width: primary.width,
                height: primary.height,
                alpha_width: alpha.width,
                alpha_height: alpha.height,
            });
        }
    }

    let (width, height) = tiled_dimensions(primary.width, primary.height);
    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    let mut ar = [0u16; TEXELS_PER_TILE];
    let mut gb = [0u16; TEXELS_PER_TILE];

    for (tile_x, tile_y) in tile_origins(primary.width, primary.height) {
        for (i, (x, y)) in tile_texels(tile_x, tile_y).enumerate() {
            let [a, r, g, b] = texel(source, x, y);
            ar[i] = u16::from_be_bytes([a, r]);
            gb[i] = u16::from_be_bytes([g, b]);
        }
        for word in ar.iter().chain(gb.iter()) {
            out.write_u16::<BE>(*word)?;
        }
    }

    Ok(out)
}

fn texel(source: &TextureSource<'_>, x: u32, y: u32) -> [u8; 4] {
    let [a, r, g, b] = unpack_argb(source.primary.pixel(x, y));
    let a = match source.primary.layout {
        PixelLayout::Argb32 => a,
        PixelLayout::Rgb24 => match source.alpha {
            Some(mask) => (mask.pixel(x, y) & 0xFF) as u8,
            None if source.replace_alpha_with_blue => b,
            None => 0xFF,
        },
    };
    [a, r, g, b]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::pack_argb;
    use proptest::prelude::*;

    /// Reassemble packed pixels from tiled RGBA8 bytes.
    fn detile(bytes: &[u8], width: u32, height: u32) -> Vec<u32> {
        let mut pixels = vec![0u32; width as usize * height as usize];
        let words: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|w| u16::from_be_bytes([w[0], w[1]]))
            .collect();
        for (tile, (tile_x, tile_y)) in tile_origins(width, height).enumerate() {
            let base = tile * TEXELS_PER_TILE * 2;
            for (i, (x, y)) in tile_texels(tile_x, tile_y).enumerate() {
                let [a, r] = words[base + i].to_be_bytes();
                let [g, b] = words[base + TEXELS_PER_TILE + i].to_be_bytes();
                pixels[(y * width + x) as usize] = pack_argb(a, r, g, b);
            }
        }
        pixels
    }

    fn source<'a>(primary: &'a PixelBuffer, alpha: Option<&'a PixelBuffer>) -> TextureSource<'a> {
        TextureSource {
            name: "test#00000000#0#2_all.png",
            primary,
            alpha,
            replace_alpha_with_blue: false,
        }
    }

    #[test]
    fn single_tile_layout() {
        let pixels = (0..16u8)
            .map(|i| pack_argb(0xA0 | i, 0x10 | i, 0x20 | i, 0x30 | i))
            .collect();
        let image = PixelBuffer::new(4, 4, PixelLayout::Argb32, pixels);

        let out = convert_rgba8(&source(&image, None)).unwrap();
        assert_eq!(out.len(), 64);
        // AR plane first, big-endian words.
        assert_eq!(&out[0..4], &[0xA0, 0x10, 0xA1, 0x11]);
        assert_eq!(&out[30..32], &[0xAF, 0x1F]);
        // GB plane follows for the same pixels.
        assert_eq!(&out[32..36], &[0x20, 0x30, 0x21, 0x31]);
        assert_eq!(&out[62..64], &[0x2F, 0x3F]);
    }

    #[test]
    fn tiles_follow_row_major_order() {
        // 8x4: two tiles side by side. Pixel value encodes its x coordinate.
        let pixels = (0..4)
            .flat_map(|_| (0..8u8).map(|x| pack_argb(0xFF, x, 0, 0)))
            .collect();
        let image = PixelBuffer::new(8, 4, PixelLayout::Argb32, pixels);

        let out = convert_rgba8(&source(&image, None)).unwrap();
        assert_eq!(out.len(), 128);
        // Second tile starts at byte 64 with pixel (4, 0).
        assert_eq!(&out[64..66], &[0xFF, 4]);
        // Within the first tile, the fifth texel is (0, 1).
        assert_eq!(&out[8..10], &[0xFF, 0]);
    }

    #[test]
    fn rgb_without_alpha_source_is_opaque() {
        let pixels = (0..64u32).map(|i| i * 0x010203).collect();
        let image = PixelBuffer::new(8, 8, PixelLayout::Rgb24, pixels);

        let out = convert_rgba8(&source(&image, None)).unwrap();
        for pixel in detile(&out, 8, 8) {
            assert_eq!(unpack_argb(pixel)[0], 0xFF);
        }
    }

    #[test]
    fn rgb_alpha_from_blue_channel() {
        let pixels = (0..16u8).map(|i| pack_argb(0, 1, 2, i * 16)).collect();
        let image = PixelBuffer::new(4, 4, PixelLayout::Rgb24, pixels);
        let mut src = source(&image, None);
        src.replace_alpha_with_blue = true;

        let out = convert_rgba8(&src).unwrap();
        for pixel in detile(&out, 4, 4) {
            let [a, _, _, b] = unpack_argb(pixel);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn rgb_alpha_from_mask_wins_over_blue() {
        let image = PixelBuffer::new(4, 4, PixelLayout::Rgb24, vec![0x00112233; 16]);
        let mask = PixelBuffer::new(
            4,
            4,
            PixelLayout::Argb32,
            (0..16u32).map(|i| 0xFF000000 | (i * 0x111111)).collect(),
        );
        let mut src = source(&image, Some(&mask));
        src.replace_alpha_with_blue = true;

        let out = convert_rgba8(&src).unwrap();
        for (i, pixel) in detile(&out, 4, 4).into_iter().enumerate() {
            assert_eq!(pixel, pack_argb((i as u8) * 0x11, 0x11, 0x22, 0x33));
        }
    }

    #[test]
    fn rgba_ignores_alpha_mask() {
        let image = PixelBuffer::new(4, 4, PixelLayout::Argb32, vec![0x80112233; 16]);
        let mask = PixelBuffer::new(4, 4, PixelLayout::Argb32, vec![0xFFFFFF00; 16]);

        let out = convert_rgba8(&source(&image, Some(&mask))).unwrap();
        assert!(detile(&out, 4, 4).iter().all(|p| *p == 0x80112233));
    }

    #[test]
    fn mismatched_alpha_mask_is_rejected() {
        let image = PixelBuffer::new(4, 4, PixelLayout::Rgb24, vec![0; 16]);
        let mask = PixelBuffer::new(4, 8, PixelLayout::Argb32, vec![0; 32]);

        let err = convert_rgba8(&source(&image, Some(&mask))).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                width: 4,
                height: 4,
                alpha_width: 4,
                alpha_height: 8,
                ..
            }
        ));
    }

    #[test]
    fn partial_tiles_are_dropped_using_source_stride() {
        // 6x5: only the top-left 4x4 survives. Pixels encode (x, y).
        let pixels = (0..5u8)
            .flat_map(|y| (0..6u8).map(move |x| pack_argb(0xFF, x, y, 0)))
            .collect();
        let image = PixelBuffer::new(6, 5, PixelLayout::Argb32, pixels);

        let out = convert_rgba8(&source(&image, None)).unwrap();
        assert_eq!(out.len(), 64);
        for (pixel, (x, y)) in detile(&out, 4, 4).into_iter().zip(tile_texels(0, 0)) {
            let [_, r, g, _] = unpack_argb(pixel);
            assert_eq!((u32::from(r), u32::from(g)), (x, y));
        }
    }

    #[test]
    fn tiny_images_produce_no_tiles() {
        let image = PixelBuffer::new(3, 3, PixelLayout::Argb32, vec![0; 9]);
        assert!(convert_rgba8(&source(&image, None)).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn argb32_round_trips_through_tiling(
            (tiles_x, tiles_y, pixels) in (1u32..5, 1u32..5).prop_flat_map(|(tx, ty)| {
                let len = (tx * ty * 16) as usize;
                (Just(tx), Just(ty), proptest::collection::vec(any::<u32>(), len))
            })
        ) {
            let (width, height) = (tiles_x * 4, tiles_y * 4);
            let image = PixelBuffer::new(width, height, PixelLayout::Argb32, pixels.clone());

            let out = convert_rgba8(&source(&image, None)).unwrap();
            prop_assert_eq!(out.len(), (width * height * 4) as usize);
            prop_assert_eq!(detile(&out, width, height), pixels);
        }
    }
}
