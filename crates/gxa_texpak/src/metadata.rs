//! Texture identity parsed from hi-res texture file names.
//!
//! Texture dumps name every file after the texture it replaces:
//!
//! ```text
//! SUPER MARIO 64#0B6D2926#0#2_all.png
//! SUPER MARIO 64#D8903B0B#0#2_rgb.png
//! SUPER MARIO 64#9FBECEF9#0#2_a.png
//! WAVE RACE 64#FAF51949#2#1#897BF8BE_ciByRGBA.png
//! ```
//!
//! The segments after the first `#` are the texture CRC, the N64 texture format,
//! the texel size and, for palettized textures, the palette CRC. The suffix after
//! the last segment records which variant of the dump produced the file.

use std::fmt;

use crate::error::{Error, Result};

/// Palette CRC used in key composition when the file name carries none.
pub const ABSENT_PALETTE_CRC: u32 = u32::MAX;

/// Which dump variant a file is, derived from its `_type` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureKind {
    /// `_all.png`: complete RGBA texture.
    All,
    /// `_rgb.png`: color only, may be paired with an `_a.png`.
    Rgb,
    /// `_a.png`: alpha channel for an `_rgb.png`.
    Alpha,
    /// `_ciByRGBA.png`: palettized texture rendered to RGBA.
    CiByRgba,
    Other(String),
}

impl TextureKind {
    /// Classify a texture by its `_type` segment (without the extension).
    pub fn from_type(ty: &str) -> Self {
        match ty.to_ascii_lowercase().as_str() {
            "all" => TextureKind::All,
            "rgb" => TextureKind::Rgb,
            "a" => TextureKind::Alpha,
            "cibyrgba" => TextureKind::CiByRgba,
            _ => TextureKind::Other(ty.to_string()),
        }
    }

    /// Classify a file name by its suffix, ignoring case.
    ///
    /// Unlike [`TextureMetadata::parse`] this does not require the name to carry
    /// valid metadata; the selector only looks at suffixes.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with("_all.png") {
            Some(TextureKind::All)
        } else if lower.ends_with("_rgb.png") {
            Some(TextureKind::Rgb)
        } else if lower.ends_with("_a.png") {
            Some(TextureKind::Alpha)
        } else if lower.ends_with("_cibyrgba.png") {
            Some(TextureKind::CiByRgba)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TextureKind::All => "all",
            TextureKind::Rgb => "rgb",
            TextureKind::Alpha => "a",
            TextureKind::CiByRgba => "ciByRGBA",
            TextureKind::Other(ty) => ty,
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity fields encoded in a texture file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureMetadata {
    /// Base name with directories stripped.
    pub file_name: String,
    pub texture_crc: u32,
    /// `None` when the name has no fourth `#` segment.
    pub palette_crc: Option<u32>,
    /// N64 texture format. Only the low nibble is meaningful.
    pub format: u16,
    /// N64 texel size. Only the low nibble is meaningful.
    pub size: u16,
    pub kind: TextureKind,
    /// Set for format family `4`, which keeps alpha in the blue channel of 24-bit sources.
    pub replace_alpha_with_blue: bool,
}

impl TextureMetadata {
    /// Parse the metadata out of a path or bare file name.
    ///
    /// Both `/` and `\` are treated as directory separators so dumps made on
    /// Windows parse the same everywhere.
    pub fn parse(path: &str) -> Result<Self> {
        let file_name = base_name(path);

        let (_, info) = file_name
            .split_once('#')
            .ok_or_else(|| Error::metadata(&file_name, "missing '#' before texture CRC"))?;

        let (crc_hex, info) = info
            .split_once('#')
            .ok_or_else(|| Error::metadata(&file_name, "missing '#' after texture CRC"))?;
        let texture_crc = parse_hex(&file_name, "texture CRC", crc_hex)?;

        let (format_hex, info) = info
            .split_once('#')
            .ok_or_else(|| Error::metadata(&file_name, "missing '#' after format"))?;
        let format = parse_hex_u16(&file_name, "format", format_hex)?;

        let (segments, rest) = info
            .split_once('_')
            .ok_or_else(|| Error::metadata(&file_name, "missing '_' before texture type"))?;

        // A '#' before the first '_' means a palette CRC follows the size.
        let (size, palette_crc) = match segments.split_once('#') {
            Some((size_hex, palette_hex)) => (
                parse_hex_u16(&file_name, "size", size_hex)?,
                Some(parse_hex(&file_name, "palette CRC", palette_hex)?),
            ),
            None => (parse_hex_u16(&file_name, "size", segments)?, None),
        };

        let ty = rest.split('.').next().unwrap_or(rest);

        Ok(Self {
            kind: TextureKind::from_type(ty),
            replace_alpha_with_blue: format_hex.starts_with('4'),
            file_name,
            texture_crc,
            palette_crc,
            format,
            size,
        })
    }

    /// The 64-bit lookup key for this texture, see [`compose_key`].
    pub fn key(&self) -> u64 {
        compose_key(self.texture_crc, self.palette_crc, self.format, self.size)
    }
}

impl fmt::Display for TextureMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} textureCRC: {:08X} (type: {}) paletteCRC: {:08X} format: {:X} size: {:X} key: {:016X}",
            self.file_name,
            self.texture_crc,
            self.kind,
            self.palette_crc.unwrap_or(ABSENT_PALETTE_CRC),
            self.format,
            self.size,
            self.key()
        )
    }
}

/// Compose the lookup key the texture loader searches for.
///
/// Layout, most significant first:
///
/// | bits  | field |
/// |-------|-------|
/// | 32-63 | texture CRC |
/// | 8-31  | top three bytes of the palette CRC (all ones when absent) |
/// | 4-7   | format nibble |
/// | 0-3   | size nibble |
pub fn compose_key(texture_crc: u32, palette_crc: Option<u32>, format: u16, size: u16) -> u64 {
    let palette = palette_crc.unwrap_or(ABSENT_PALETTE_CRC);
    (u64::from(texture_crc) << 32)
        | (u64::from(palette) & 0xFFFF_FF00)
        | (u64::from(format & 0xF) << 4)
        | u64::from(size & 0xF)
}

/// Strip directories from a path, accepting either separator.
pub fn base_name(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    match normalized.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => normalized,
    }
}

fn parse_hex(file_name: &str, field: &str, token: &str) -> Result<u32> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::metadata(
            file_name,
            format!("{field} '{token}' is not a hex number"),
        ));
    }
    u32::from_str_radix(token, 16)
        .map_err(|e| Error::metadata(file_name, format!("{field} '{token}': {e}")))
}

fn parse_hex_u16(file_name: &str, field: &str, token: &str) -> Result<u16> {
    let value = parse_hex(file_name, field, token)?;
    u16::try_from(value)
        .map_err(|_| Error::metadata(file_name, format!("{field} '{token}' exceeds 16 bits")))
}
