use std::fmt;

/// A finished symbol: the dark/light value of every module, without quiet region.
#[derive(Clone,Hash,Eq,PartialEq,Debug)]
pub struct QrMatrix {
    version: u8,
    mask: u8,
    size: usize,
    modules: Vec<bool>,     // row-major, true is dark
}

impl QrMatrix {
    pub(crate) fn new(version: u8, mask: u8, size: usize, modules: Vec<bool>) -> QrMatrix {
        debug_assert_eq!(modules.len(), size * size);
        QrMatrix { version, mask, size, modules }
    }

    /// Width and height in modules
    pub fn size(&self) -> usize {
        self.size
    }

    /// Symbol version, 1 through 10
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Index of the applied mask pattern, 0 through 7
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Whether the module at column x, row y is dark. Out of range is light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.modules.chunks(self.size)
    }

    /// Copy of the modules indexed as `[y][x]`
    pub fn to_vec(&self) -> Vec<Vec<bool>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for QrMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &dark in row {
                f.write_str(if dark { "██" } else { "  " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
