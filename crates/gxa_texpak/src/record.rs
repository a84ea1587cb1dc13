//! One converted texture, ready to be appended to an archive.

use std::fmt;

use crate::compress::compress_texture;
use crate::convert::{convert_rgba8, TextureSource};
use crate::error::{Error, Result};
use crate::metadata::{base_name, TextureMetadata};
use crate::pixels::{ImageLoader, PixelLayout};
use crate::selector::TextureJob;

/// A texture after metadata parsing, conversion and compression.
///
/// Building a record has no effect on any archive, so records can be built in
/// parallel and appended later. Only [`ArchiveWriter::append`](crate::archive::ArchiveWriter::append)
/// assigns [`offset`](Self::offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    pub metadata: TextureMetadata,
    /// Decoded width, before truncation to whole tiles.
    pub width: u32,
    /// Decoded height, before truncation to whole tiles.
    pub height: u32,
    pub alpha_width: Option<u32>,
    pub alpha_height: Option<u32>,
    pub pixel_layout: PixelLayout,
    pub alpha_layout: Option<PixelLayout>,
    /// Gzip-compressed tiled RGBA8 texture.
    pub payload: Vec<u8>,
    pub offset: Option<u32>,
}

impl TextureRecord {
    /// Parse, decode, convert and compress one selected texture.
    pub fn from_job(job: &TextureJob, loader: &dyn ImageLoader) -> Result<Self> {
        let metadata = TextureMetadata::parse(job.primary.as_str())?;

        let primary = loader.load(&job.primary)?;
        tile_counts(&metadata.file_name, primary.width, primary.height)?;

        let alpha = match &job.alpha {
            Some(path) => Some(loader.load_rgba(path)?),
            None => None,
        };

        let raw = convert_rgba8(&TextureSource {
            name: &metadata.file_name,
            primary: &primary,
            alpha: alpha.as_ref(),
            replace_alpha_with_blue: metadata.replace_alpha_with_blue,
        })?;
        let payload = compress_texture(&raw)?;

        Ok(Self {
            width: primary.width,
            height: primary.height,
            alpha_width: alpha.as_ref().map(|a| a.width),
            alpha_height: alpha.as_ref().map(|a| a.height),
            pixel_layout: primary.layout,
            alpha_layout: alpha.as_ref().map(|a| a.layout),
            payload,
            offset: None,
            metadata,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.metadata.file_name
    }

    pub fn key(&self) -> u64 {
        self.metadata.key()
    }

    pub fn compressed_length(&self) -> usize {
        self.payload.len()
    }

    /// Width and height in tiles, as stored in the entry prefix.
    pub fn tile_counts(&self) -> Result<(u8, u8)> {
        tile_counts(&self.metadata.file_name, self.width, self.height)
    }
}

fn tile_counts(file_name: &str, width: u32, height: u32) -> Result<(u8, u8)> {
    match (u8::try_from(width / 4), u8::try_from(height / 4)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(Error::EntryTooLarge {
            file_name: base_name(file_name),
            width,
            height,
        }),
    }
}

impl fmt::Display for TextureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} width * height: {} x {} compressedLength: {} pixel type: {}",
            self.metadata,
            self.width,
            self.height,
            self.compressed_length(),
            self.pixel_layout.describe()
        )?;
        if let Some(alpha) = self.alpha_layout {
            write!(f, " alpha type: {}", alpha.describe())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::PixelBuffer;
    use camino::{Utf8Path, Utf8PathBuf};
    use flate2::read::GzDecoder;
    use std::collections::HashMap;
    use std::io::Read;

    /// Serves fixed buffers by file name.
    #[derive(Default)]
    struct FakeLoader(HashMap<String, PixelBuffer>);

    impl FakeLoader {
        fn with(mut self, name: &str, buffer: PixelBuffer) -> Self {
            self.0.insert(name.to_string(), buffer);
            self
        }

        fn get(&self, path: &Utf8Path) -> Result<PixelBuffer> {
            self.0
                .get(path.file_name().unwrap())
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound).into())
        }
    }

    impl ImageLoader for FakeLoader {
        fn load(&self, path: &Utf8Path) -> Result<PixelBuffer> {
            self.get(path)
        }

        fn load_rgba(&self, path: &Utf8Path) -> Result<PixelBuffer> {
            self.get(path)
        }
    }

    fn job(primary: &str, alpha: Option<&str>) -> TextureJob {
        TextureJob {
            primary: Utf8PathBuf::from(primary),
            alpha: alpha.map(Utf8PathBuf::from),
        }
    }

    #[test]
    fn builds_record_from_rgb_and_alpha() {
        let loader = FakeLoader::default()
            .with(
                "G#D8903B0B#0#2_rgb.png",
                PixelBuffer::new(8, 4, PixelLayout::Rgb24, vec![0xFF102030; 32]),
            )
            .with(
                "G#D8903B0B#0#2_a.png",
                PixelBuffer::new(8, 4, PixelLayout::Argb32, vec![0xFF000080; 32]),
            );

        let record = TextureRecord::from_job(
            &job("dump/G#D8903B0B#0#2_rgb.png", Some("dump/G#D8903B0B#0#2_a.png")),
            &loader,
        )
        .unwrap();

        assert_eq!(record.file_name(), "G#D8903B0B#0#2_rgb.png");
        assert_eq!((record.width, record.height), (8, 4));
        assert_eq!((record.alpha_width, record.alpha_height), (Some(8), Some(4)));
        assert_eq!(record.tile_counts().unwrap(), (2, 1));
        assert_eq!(record.offset, None);
        assert_eq!(record.key(), 0xD8903B0B_FFFFFF02);

        let mut raw = Vec::new();
        GzDecoder::new(record.payload.as_slice())
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw.len(), 8 * 4 * 4);
        // First AR word: mask alpha, primary red.
        assert_eq!(&raw[..2], &[0x80, 0x10]);

        let line = record.to_string();
        assert!(line.contains("width * height: 8 x 4"));
        assert!(line.contains("alpha type: 32-bit RGBA"));
    }

    #[test]
    fn mismatched_alpha_fails() {
        let loader = FakeLoader::default()
            .with(
                "G#1#0#2_rgb.png",
                PixelBuffer::new(4, 4, PixelLayout::Rgb24, vec![0; 16]),
            )
            .with(
                "G#1#0#2_a.png",
                PixelBuffer::new(8, 8, PixelLayout::Argb32, vec![0; 64]),
            );

        let err = TextureRecord::from_job(&job("G#1#0#2_rgb.png", Some("G#1#0#2_a.png")), &loader)
            .unwrap_err();
        match err {
            Error::DimensionMismatch { file_name, .. } => assert_eq!(file_name, "G#1#0#2_rgb.png"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_name_fails_before_decoding() {
        let err = TextureRecord::from_job(&job("dump/G#1#0_all.png", None), &FakeLoader::default())
            .unwrap_err();
        assert!(matches!(err, Error::MetadataParse { .. }));
    }

    #[test]
    fn oversized_texture_is_rejected() {
        let loader = FakeLoader::default().with(
            "G#1#0#2_all.png",
            PixelBuffer::new(1024, 4, PixelLayout::Argb32, vec![0; 4096]),
        );
        let err = TextureRecord::from_job(&job("G#1#0#2_all.png", None), &loader).unwrap_err();
        assert!(matches!(
            err,
            Error::EntryTooLarge {
                width: 1024,
                height: 4,
                ..
            }
        ));
    }
}
