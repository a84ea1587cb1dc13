//! Hi-res texture pack writer.
//!
//! Turns a directory of dumped texture replacements into a single `GXA1`
//! archive that an emulator's texture loader can search by key. It handles:
//!
//! - **File name metadata**: texture CRC, format, size and palette CRC
//! - **Variant selection**: `_all` over `_rgb` + `_a`, plus `_ciByRGBA`
//! - **RGBA8 tiling**: 4x4 tiles split into AR and GB planes
//! - **Compression**: one gzip member per texture
//! - **Lookup table**: 64-bit keys sorted for binary search
//!
//! # Example
//!
//! ```no_run
//! use gxa_texpak::{ArchiveHeader, Packer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let header = ArchiveHeader::new()
//!     .with_description("Super Mario 64 hi-res")
//!     .with_author("me");
//!
//! let summary = Packer::new(header)
//!     .with_parallel_conversion(true)
//!     .with_progress(|progress| {
//!         println!("{:?} {}/{}", progress.stage, progress.current, progress.total);
//!     })
//!     .pack_directory("dumps/SUPER MARIO 64", "out/sm64.gxa")?;
//!
//! println!("Entries added: {}", summary.entries_added);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod compress;
pub mod convert;
pub mod error;
pub mod icon;
pub mod metadata;
pub mod packer;
pub mod pixels;
pub mod record;
pub mod selector;

pub use archive::{ArchiveHeader, ArchiveSummary, ArchiveWriter, LutEntry};
pub use error::{Error, Result};
pub use metadata::{TextureKind, TextureMetadata};
pub use packer::{PackProgress, PackStage, PackSummary, Packer};
pub use pixels::{ImageLoader, PixelBuffer, PixelLayout, PngLoader};
pub use record::TextureRecord;
pub use selector::{Selection, TextureJob};
