//! Error types for texture packing.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. External error types (`std::io::Error`, `image::ImageError`,
//! `binrw::Error`) are converted via `From` impls.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting textures or writing an archive.
#[derive(Error, Debug)]
pub enum Error {
    /// A texture filename does not follow the `#crc#format#size[#palette]_type.png` convention.
    #[error("Malformed texture file name '{file_name}': {reason}")]
    MetadataParse { file_name: String, reason: String },

    /// A paired alpha image does not have the same dimensions as its primary image.
    #[error(
        "Alpha image dimensions {alpha_width}x{alpha_height} differ from {width}x{height} for '{file_name}'"
    )]
    DimensionMismatch {
        file_name: String,
        width: u32,
        height: u32,
        alpha_width: u32,
        alpha_height: u32,
    },

    /// The decoded image is neither 24-bit RGB nor 32-bit RGBA.
    #[error("Unsupported pixel format {color_type} in '{path}'")]
    UnsupportedPixelFormat { path: Utf8PathBuf, color_type: String },

    /// The banner icon is not 96x72.
    #[error("Banner icon must be 96x72, got {width}x{height}")]
    InvalidIconDimensions { width: u32, height: u32 },

    /// A header text field is longer than its fixed slot.
    #[error("{field} is {len} bytes long, at most {max} fit in the header")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Width or height divided by 4 does not fit in the entry's single size byte.
    #[error("Texture '{file_name}' is too large to store ({width}x{height})")]
    EntryTooLarge {
        file_name: String,
        width: u32,
        height: u32,
    },

    /// The archive grew past what a 32-bit offset can address.
    #[error("Archive position {position} does not fit in a 32-bit offset")]
    ArchiveTooLarge { position: u64 },

    /// Filesystem I/O failed (reading textures, writing the archive).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The image decoder rejected a file.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Serializing a lookup table row failed.
    #[error("binrw error: {0}")]
    BinWrite(#[from] binrw::Error),

    /// A texture file name is not valid UTF-8.
    #[error("Non UTF-8 path: {0}")]
    NonUtf8Path(String),
}

impl Error {
    pub(crate) fn metadata(file_name: &str, reason: impl Into<String>) -> Self {
        Error::MetadataParse {
            file_name: file_name.to_string(),
            reason: reason.into(),
        }
    }
}
