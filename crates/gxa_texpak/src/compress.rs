use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::Result;

/// Wrap a converted texture in a single gzip member.
pub fn compress_texture(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn gunzip(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn produces_gzip_member() {
        let raw: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let compressed = compress_texture(&raw).unwrap();

        assert_eq!(&compressed[..2], &[0x1F, 0x8B]);
        assert!(compressed.len() < raw.len());
        assert_eq!(gunzip(&compressed), raw);
    }

    #[test]
    fn empty_input_is_valid_gzip() {
        let compressed = compress_texture(&[]).unwrap();
        assert!(gunzip(&compressed).is_empty());
    }
}
