//! The `GXA1` texture archive container.
//!
//! All integers are big-endian.
//!
//! ```text
//! 0x0000  magic "GXA1"                       4
//! 0x0004  description                       64
//! 0x0044  author                            16
//! 0x0054  packer                            16
//! 0x0064  date "yyyy/mm/dd"                 12
//! 0x0070  banner icon, RGB5A3           13824
//! 0x3670  lookup table offset (u32)          4
//! 0x3674  entry count (u32)                  4
//! 0x3678  entries, each 4-byte aligned:
//!           u8 width / 4, u8 height / 4, u8 texture format, gzip payload
//! table   lookup rows sorted by key, 4-byte aligned:
//!           u64 key, u32 entry offset
//! ```
//!
//! Entries carry no length; a reader finds them through the lookup table.

mod header;
mod lut;
mod writer;

pub use header::*;
pub use lut::*;
pub use writer::*;
