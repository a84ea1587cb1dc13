use std::io::Write;

use crate::error::{Error, Result};
use crate::icon::{convert_icon, ICON_BYTES};
use crate::pixels::PixelBuffer;

pub const MAGIC: &[u8; 4] = b"GXA1";

pub const DESCRIPTION_LEN: usize = 64;
pub const AUTHOR_LEN: usize = 16;
pub const PACKER_LEN: usize = 16;
pub const DATE_LEN: usize = 12;

/// Offset of the table offset and entry count fields.
pub const TABLE_POINTER_OFFSET: u64 =
    (MAGIC.len() + DESCRIPTION_LEN + AUTHOR_LEN + PACKER_LEN + DATE_LEN + ICON_BYTES) as u64;

/// Size of the fixed header. The first entry starts here.
pub const HEADER_SIZE: u64 = TABLE_POINTER_OFFSET + 8;

/// Descriptive fields written at the start of every archive.
///
/// Text fields occupy fixed slots; longer values are cut at the slot size and
/// shorter ones are zero padded. Use [`ArchiveHeader::check_lengths`] to reject
/// values that would be cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub description: String,
    pub author: String,
    pub packer: String,
    /// `yyyy/mm/dd`.
    pub date: String,
    icon: Option<Vec<u8>>,
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: String::new(),
            packer: String::new(),
            date: Self::today(),
            icon: None,
        }
    }
}

impl ArchiveHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_packer(mut self, packer: impl Into<String>) -> Self {
        self.packer = packer.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set the banner icon. The image must be exactly 96x72.
    pub fn with_icon(mut self, icon: &PixelBuffer) -> Result<Self> {
        self.icon = Some(convert_icon(icon)?);
        Ok(self)
    }

    /// The converted RGB5A3 banner, if one was set.
    pub fn icon(&self) -> Option<&[u8]> {
        self.icon.as_deref()
    }

    /// Today's local date in header format.
    pub fn today() -> String {
        chrono::Local::now().format("%Y/%m/%d").to_string()
    }

    /// Fail if any text field would be truncated.
    pub fn check_lengths(&self) -> Result<()> {
        for (field, value, max) in [
            ("description", &self.description, DESCRIPTION_LEN),
            ("author", &self.author, AUTHOR_LEN),
            ("packer", &self.packer, PACKER_LEN),
            ("date", &self.date, DATE_LEN),
        ] {
            if value.len() > max {
                return Err(Error::FieldTooLong {
                    field,
                    len: value.len(),
                    max,
                });
            }
        }
        Ok(())
    }

    /// Write everything up to, not including, the table pointer.
    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(MAGIC)?;
        write_fixed(writer, &self.description, DESCRIPTION_LEN)?;
        write_fixed(writer, &self.author, AUTHOR_LEN)?;
        write_fixed(writer, &self.packer, PACKER_LEN)?;
        write_fixed(writer, &self.date, DATE_LEN)?;
        match &self.icon {
            Some(icon) => writer.write_all(icon)?,
            None => writer.write_all(&[0; ICON_BYTES])?,
        }
        Ok(())
    }
}

fn write_fixed<W: Write>(writer: &mut W, value: &str, len: usize) -> Result<()> {
    let mut slot = vec![0u8; len];
    let bytes = value.as_bytes();
    let n = bytes.len().min(len);
    slot[..n].copy_from_slice(&bytes[..n]);
    writer.write_all(&slot)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::PixelLayout;

    #[test]
    fn header_layout_offsets() {
        assert_eq!(TABLE_POINTER_OFFSET, 0x3670);
        assert_eq!(HEADER_SIZE, 13944);
    }

    #[test]
    fn writes_fixed_slots() {
        let header = ArchiveHeader::new()
            .with_description("Hi-res pack")
            .with_author("someone with a very long name")
            .with_packer("gxa")
            .with_date("2024/01/31");

        let mut out = Vec::new();
        header.write(&mut out).unwrap();
        assert_eq!(out.len() as u64, TABLE_POINTER_OFFSET);

        assert_eq!(&out[..4], b"GXA1");
        assert_eq!(&out[0x04..0x0F], b"Hi-res pack");
        assert!(out[0x0F..0x44].iter().all(|b| *b == 0));
        // Author is cut at 16 bytes.
        assert_eq!(&out[0x44..0x54], b"someone with a v");
        assert_eq!(&out[0x54..0x57], b"gxa");
        assert_eq!(&out[0x64..0x6E], b"2024/01/31");
        assert_eq!(&out[0x6E..0x70], &[0, 0]);
        assert!(out[0x70..].iter().all(|b| *b == 0));
    }

    #[test]
    fn icon_is_written_after_date() {
        let icon = PixelBuffer::new(96, 72, PixelLayout::Argb32, vec![0xFFFFFFFF; 96 * 72]);
        let header = ArchiveHeader::new().with_icon(&icon).unwrap();

        let mut out = Vec::new();
        header.write(&mut out).unwrap();
        assert_eq!(out.len() as u64, TABLE_POINTER_OFFSET);
        assert!(out[0x70..].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn today_has_header_format() {
        let today = ArchiveHeader::today();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[4..5], "/");
        assert_eq!(&today[7..8], "/");
    }

    #[test]
    fn check_lengths_rejects_long_fields() {
        let header = ArchiveHeader::new().with_packer("x".repeat(17));
        assert!(matches!(
            header.check_lengths(),
            Err(Error::FieldTooLong {
                field: "packer",
                len: 17,
                max: 16
            })
        ));
        assert!(ArchiveHeader::new().with_author("x".repeat(16)).check_lengths().is_ok());
    }
}
