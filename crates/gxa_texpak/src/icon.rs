//! Banner icon conversion to tiled RGB5A3.

use byteorder::{WriteBytesExt, BE};

use crate::convert::{tile_origins, tile_texels};
use crate::error::{Error, Result};
use crate::pixels::{unpack_argb, PixelBuffer};

pub const ICON_WIDTH: u32 = 96;
pub const ICON_HEIGHT: u32 = 72;
/// Size of the icon slot in the archive header.
pub const ICON_BYTES: usize = (ICON_WIDTH * ICON_HEIGHT * 2) as usize;

/// Convert a 96x72 banner to big-endian RGB5A3 in 4x4 tiles.
///
/// Pixels whose top three alpha bits are all set are stored opaque as RGB555,
/// everything else as 3-bit alpha plus RGB444.
pub fn convert_icon(icon: &PixelBuffer) -> Result<Vec<u8>> {
    if icon.dimensions() != (ICON_WIDTH, ICON_HEIGHT) {
        return Err(Error::InvalidIconDimensions {
            width: icon.width,
            height: icon.height,
        });
    }

    let mut out = Vec::with_capacity(ICON_BYTES);
    for (tile_x, tile_y) in tile_origins(icon.width, icon.height) {
        for (x, y) in tile_texels(tile_x, tile_y) {
            out.write_u16::<BE>(rgb5a3(icon.pixel(x, y)))?;
        }
    }
    Ok(out)
}

fn rgb5a3(pixel: u32) -> u16 {
    let [a, r, g, b] = unpack_argb(pixel).map(u16::from);
    if a & 0xE0 != 0xE0 {
        (a >> 5) << 12 | (r >> 4) << 8 | (g >> 4) << 4 | b >> 4
    } else {
        0x8000 | (r >> 3) << 10 | (g >> 3) << 5 | b >> 3
    }
}
