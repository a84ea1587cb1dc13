use std::io::{Seek, SeekFrom, Write};

use binrw::BinWrite;
use byteorder::{WriteBytesExt, BE};

use super::header::{ArchiveHeader, TABLE_POINTER_OFFSET};
use super::lut::{sort_lut, LutEntry};
use crate::convert::GX_TF_RGBA8;
use crate::error::{Error, Result};
use crate::record::TextureRecord;

/// Entries and the lookup table start on 4-byte boundaries.
pub const ENTRY_ALIGNMENT: u64 = 4;

/// What [`ArchiveWriter::finalize`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entry_count: u32,
    pub table_offset: u32,
    /// Total archive size in bytes.
    pub archive_size: u64,
}

/// Streams texture entries into an archive.
///
/// The header is written on construction, entries are appended one at a time
/// and [`finalize`](Self::finalize) writes the lookup table and patches the
/// header. Finalizing consumes the writer, so no entry can follow the table.
pub struct ArchiveWriter<W: Write + Seek> {
    writer: W,
    lut: Vec<LutEntry>,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Write the header and reserve the table pointer.
    pub fn new(mut writer: W, header: &ArchiveHeader) -> Result<Self> {
        header.write(&mut writer)?;

        // Table offset and entry count, patched in finalize
        writer.write_u32::<BE>(0)?;
        writer.write_u32::<BE>(0)?;

        Ok(Self {
            writer,
            lut: Vec::new(),
        })
    }

    /// Append a converted texture and return the offset of its entry.
    ///
    /// The offset is also stored on the record.
    pub fn append(&mut self, record: &mut TextureRecord) -> Result<u32> {
        let (width_tiles, height_tiles) = record.tile_counts()?;

        write_alignment(&mut self.writer)?;
        let offset = to_offset(self.writer.stream_position()?)?;

        self.writer.write_u8(width_tiles)?;
        self.writer.write_u8(height_tiles)?;
        self.writer.write_u8(GX_TF_RGBA8)?;
        self.writer.write_all(&record.payload)?;

        self.lut.push(LutEntry::new(record.key(), offset));
        record.offset = Some(offset);

        tracing::debug!(
            "Wrote {} at offset {:#X} ({} bytes)",
            record.file_name(),
            offset,
            record.compressed_length()
        );
        Ok(offset)
    }

    pub fn entry_count(&self) -> usize {
        self.lut.len()
    }

    /// Write the sorted lookup table and patch the header.
    pub fn finalize(mut self) -> Result<ArchiveSummary> {
        write_alignment(&mut self.writer)?;
        let table_offset = to_offset(self.writer.stream_position()?)?;
        let entry_count =
            u32::try_from(self.lut.len()).map_err(|_| Error::ArchiveTooLarge {
                position: self.lut.len() as u64,
            })?;

        sort_lut(&mut self.lut);
        for entry in &self.lut {
            entry.write(&mut self.writer)?;
        }
        let archive_size = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(TABLE_POINTER_OFFSET))?;
        self.writer.write_u32::<BE>(table_offset)?;
        self.writer.write_u32::<BE>(entry_count)?;
        self.writer.seek(SeekFrom::Start(archive_size))?;
        self.writer.flush()?;

        tracing::debug!(
            "Finalized archive: {} entries, table at {:#X}",
            entry_count,
            table_offset
        );

        Ok(ArchiveSummary {
            entry_count,
            table_offset,
            archive_size,
        })
    }
}

fn write_alignment<W: Write + Seek>(writer: &mut W) -> Result<()> {
    let current_pos = writer.stream_position()?;
    let padding = (ENTRY_ALIGNMENT - current_pos % ENTRY_ALIGNMENT) % ENTRY_ALIGNMENT;
    for _ in 0..padding {
        writer.write_all(&[0])?;
    }
    Ok(())
}

fn to_offset(position: u64) -> Result<u32> {
    u32::try_from(position).map_err(|_| Error::ArchiveTooLarge { position })
}
