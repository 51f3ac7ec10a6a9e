/// Contains the lookup table with the reference data needed to encode a byte mode
/// symbol at error correction level L, and the selection of the smallest version
/// that holds a given message.

use crate::error::{QrError, Result};

use tracing::debug;

#[derive(Clone,Copy,Hash,Eq,PartialEq,Debug)]
pub struct VersionInfo {
    pub version: u8,
    pub size: usize,            // width & height in modules, without quiet region
    pub data_codewords: usize,  // total number of data codewords over all blocks
    pub capacity: usize,        // data capacity measured in bytes when using bytes encoding
    pub ecc_per_block: usize,   // ecc codewords appended to every block

    pub group1_blocks: usize,
    pub group1_data_codewords: usize,
    pub group2_blocks: usize,
    pub group2_data_codewords: usize,
}

impl VersionInfo {
    pub const fn new(version: u8,
                     data_codewords: usize,
                     capacity: usize,
                     ecc_per_block: usize,
                     group1: (usize, usize),
                     group2: (usize, usize)) -> VersionInfo {
        VersionInfo {
            version,
            size: version as usize * 4 + 17,
            data_codewords,
            capacity,
            ecc_per_block,
            group1_blocks: group1.0,
            group1_data_codewords: group1.1,
            group2_blocks: group2.0,
            group2_data_codewords: group2.1,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.group1_blocks + self.group2_blocks
    }

    /// Length of the final interleaved data + ecc codeword stream
    pub fn total_codewords(&self) -> usize {
        self.data_codewords + self.ecc_per_block * self.total_blocks()
    }

    /// Number of bits of the character count indicator in byte mode. This
    /// depends only on the version number, not on the message length.
    pub fn char_count_bits(&self) -> u32 {
        if self.version <= 9 { 8 } else { 16 }
    }

    /// Symbols of version 7 and up carry the two 6x3 version information blocks
    pub fn has_version_info(&self) -> bool {
        self.version >= 7
    }

    /// Centre coordinates (row and column alike) of the alignment patterns,
    /// i.e. the row of table E.1 in Annex E for this version.
    pub fn alignment_pattern_coords(&self) -> Vec<usize> {
        if self.version == 1 {
            return Vec::new();
        }
        let v = self.version as usize;
        let count = v / 7 + 2;
        let step = (v * 8 + count * 3 + 5) / (count * 4 - 4) * 2;

        let mut row = vec![6];
        row.extend((0..count - 1).map(|i| self.size - 7 - i * step).rev());
        row
    }
}

macro_rules! define_version_table {
    {$(
        $version:expr,
        $data_words:expr,
        $capacity:expr,
        $ecc_words:expr,
        $g1_blocks:expr, $g1_words:expr,
        $g2_blocks:expr, $g2_words:expr;
    )*} => {
        pub static VERSION_TABLE: &[VersionInfo] = &[
            $(
                VersionInfo::new($version, $data_words, $capacity, $ecc_words,
                                 ($g1_blocks, $g1_words), ($g2_blocks, $g2_words)),
            )*
        ];
    }
}

// version, data codewords, byte capacity, ecc codewords per block, group 1 (blocks, words), group 2 (blocks, words)
define_version_table!(
     1,  19,  17,  7,  1,  19,  0,  0;
     2,  34,  32, 10,  1,  34,  0,  0;
     3,  55,  53, 15,  1,  55,  0,  0;
     4,  80,  78, 20,  1,  80,  0,  0;
     5, 108, 106, 26,  1, 108,  0,  0;
     6, 136, 134, 18,  2,  68,  0,  0;
     7, 156, 154, 20,  2,  78,  0,  0;
     8, 194, 192, 24,  2,  97,  0,  0;
     9, 232, 230, 30,  2, 116,  0,  0;
    10, 274, 271, 18,  2,  68,  2, 69;
);

/// Largest message, in bytes, that still fits into a symbol
pub fn max_capacity() -> usize {
    VERSION_TABLE.last().map_or(0, |v| v.capacity)
}

/// Pick the smallest version whose byte capacity holds `len` bytes
pub fn select_version(len: usize) -> Result<&'static VersionInfo> {
    let info = VERSION_TABLE
        .iter()
        .find(|v| v.capacity >= len)
        .ok_or(QrError::CapacityExceeded { len, max: max_capacity() })?;
    debug!(bytes = len, version = info.version, "selected symbol version");
    Ok(info)
}

/// Look up a version by its number, 1 through 10
pub fn lookup_version(version: u8) -> Option<&'static VersionInfo> {
    VERSION_TABLE.iter().find(|v| v.version == version)
}
