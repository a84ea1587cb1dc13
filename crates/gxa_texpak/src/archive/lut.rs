use binrw::binrw;

/// One lookup table row: a texture key and the offset of its entry.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutEntry {
    pub key: u64,
    pub offset: u32,
}

impl LutEntry {
    pub const SIZE: usize = 12;

    pub fn new(key: u64, offset: u32) -> Self {
        Self { key, offset }
    }
}

/// Sort rows by unsigned key, keeping insertion order among equal keys.
pub fn sort_lut(entries: &mut [LutEntry]) {
    entries.sort_by_key(|entry| entry.key);
}
