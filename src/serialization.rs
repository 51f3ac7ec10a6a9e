use bitstream_io::{BigEndian, BitRead, BitReader};
use itertools::iproduct;

use std::io::Cursor;
use std::ops::Index;

use crate::tables::VersionInfo;


pub mod masking;

/// A single cell of the symbol under construction.
///
/// Function modules (finder, separator, timing and alignment patterns, the dark
/// module and the format/version information areas) are fixed once drawn; only
/// the encoding region receives data bits and is touched by masking.
#[derive(Clone,Copy,Hash,Eq,PartialEq,Debug)]
pub enum Module {
    /// encoding region, no bit placed yet
    Empty,
    /// encoding region carrying a data or ecc bit
    Data(bool),
    /// function pattern or reserved information area
    Function(bool),
}

impl Module {
    pub fn is_dark(self) -> bool {
        match self {
            Module::Empty => false,
            Module::Data(dark) | Module::Function(dark) => dark,
        }
    }

    pub fn is_function(self) -> bool {
        matches!(self, Module::Function(_))
    }
}

/// Square grid of modules addressed by (column, row), both starting at 0.
/// There is no quiet region in the canvas.
#[derive(Clone,Debug)]
pub struct Canvas {
    size: usize,
    modules: Vec<Module>,
}

impl Index<(usize, usize)> for Canvas {
    type Output = Module;

    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.modules[y * self.size + x]
    }
}

impl Canvas {
    fn new(size: usize) -> Canvas {
        Canvas { size, modules: vec![Module::Empty; size * size] }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        self.modules[y * self.size + x] = Module::Function(dark);
    }

    /// Claim a module for the information areas without changing function
    /// modules that are already there
    fn reserve(&mut self, x: usize, y: usize) {
        let module = &mut self.modules[y * self.size + x];
        if !module.is_function() {
            *module = Module::Function(false);
        }
    }

    /// Write a data bit; function modules are left alone
    fn set_data(&mut self, x: usize, y: usize, dark: bool) {
        let module = &mut self.modules[y * self.size + x];
        if !module.is_function() {
            *module = Module::Data(dark);
        }
    }

    /// Dark/light values, row by row
    pub fn to_bits(&self) -> Vec<bool> {
        self.modules.iter().map(|m| m.is_dark()).collect()
    }
}

/// Paints a finder pattern centered on (cx, cy) together with its light separator,
/// clipped at the symbol border.
fn draw_finder_pattern(canvas: &mut Canvas, cx: usize, cy: usize) {
    for (dx, dy) in iproduct!(-4i32..=4, -4i32..=4) {
        let x = cx as i32 + dx;
        let y = cy as i32 + dy;
        if x < 0 || y < 0 || x >= canvas.size as i32 || y >= canvas.size as i32 {
            continue;
        }
        let r = dx.abs().max(dy.abs());
        canvas.set_function(x as usize, y as usize, r < 2 || r == 3);
    }
}

/// Paints a 5x5 alignment pattern centered on (cx, cy)
fn draw_alignment_pattern(canvas: &mut Canvas, cx: usize, cy: usize) {
    for (dx, dy) in iproduct!(-2i32..=2, -2i32..=2) {
        let r = dx.abs().max(dy.abs());
        canvas.set_function((cx as i32 + dx) as usize, (cy as i32 + dy) as usize, r % 2 == 0);
    }
}

/// Creates alignment pattern centers as (x,y) pairs from all combinations of the
/// coordinates in table E.1, leaving out the three that would overlap a finder pattern
fn get_alignment_pattern_points(info: &VersionInfo) -> Vec<(usize, usize)> {
    let coords = info.alignment_pattern_coords();
    let far = info.size - 9;
    iproduct!(coords.iter().copied(), coords.iter().copied())
        .filter(|&(x, y)| {
            !((x <= 8 && y <= 8) || (x >= far && y <= 8) || (x <= 8 && y >= far))
        })
        .collect()
}

/// Return a canvas with all the function patterns painted in: the finder patterns with
/// separators, timing patterns, dark module and alignment patterns. The format information
/// areas (and version information areas from version 7 on) are reserved as light function
/// modules and receive their final values once the mask is known.
///
/// Every module that is still `Module::Empty` afterwards belongs to the encoding region.
pub fn create_qr_canvas(info: &VersionInfo) -> Canvas {
    let s = info.size;
    let mut canvas = Canvas::new(s);

    // finder patterns in the top and left corners
    draw_finder_pattern(&mut canvas, 3, 3);
    draw_finder_pattern(&mut canvas, s - 4, 3);
    draw_finder_pattern(&mut canvas, 3, s - 4);

    // timing patterns
    for i in 8..s - 8 {
        canvas.set_function(i, 6, i % 2 == 0);
        canvas.set_function(6, i, i % 2 == 0);
    }

    // dark module next to the lower left finder
    canvas.set_function(8, 4 * info.version as usize + 9, true);

    // format information areas
    for i in 0..9 {
        canvas.reserve(i, 8);
        canvas.reserve(8, i);
    }
    for i in 0..8 {
        canvas.reserve(s - 1 - i, 8);
    }
    for i in 0..7 {
        canvas.reserve(8, s - 1 - i);
    }

    for (x, y) in get_alignment_pattern_points(info) {
        draw_alignment_pattern(&mut canvas, x, y);
    }

    // version information areas
    if info.has_version_info() {
        for (i, j) in iproduct!(0..6, 0..3) {
            canvas.reserve(i, s - 11 + j);
            canvas.reserve(s - 11 + j, i);
        }
    }

    canvas
}

/// Module positions in placement order: two column wide strips from the right edge
/// to the left, alternating upwards and downwards, right column before left column.
/// The vertical timing pattern column is skipped. Function modules are included.
pub fn placement_path(size: usize) -> impl Iterator<Item = (usize, usize)> {
    (1..size).rev().step_by(2)
        .map(|right| if right <= 6 { right - 1 } else { right })
        .enumerate()
        .flat_map(move |(strip, right)| {
            (0..size).flat_map(move |step| {
                let y = if strip % 2 == 0 { size - 1 - step } else { step };
                [(right, y), (right - 1, y)]
            })
        })
}

/// Insert the interleaved codewords into the encoding region of a canvas created by the
/// create_qr_canvas function. Modules left over after the last codeword (remainder bits)
/// are set light.
pub fn insert_data_payload(canvas: &mut Canvas, codewords: &[u8]) {
    let mut reader = BitReader::endian(Cursor::new(codewords), BigEndian);

    for (x, y) in placement_path(canvas.size) {
        if canvas[(x, y)].is_function() {
            continue;
        }
        let bit = reader.read_bit().unwrap_or(false);
        canvas.set_data(x, y, bit);
    }
}

//-------------------------------------------------------------------
// FORMAT & VERSION INFO BITS
//-------------------------------------------------------------------

/// Error correction level bits of level L
const ECC_LEVEL_L_BITS: u32 = 0b01;

/// Generator polynomial of the BCH(15,5) code, x^10 + x^8 + x^5 + x^4 + x^2 + x + 1
const FORMAT_INFO_GENERATOR: u32 = 0x537;

/// XORed onto the format information so that it is never all zero
const FORMAT_INFO_MASK: u32 = 0x5412;

/// Generator polynomial of the BCH(18,6) code, x^12 + x^11 + x^10 + x^9 + x^8 + x^5 + x^2 + 1
const VERSION_INFO_GENERATOR: u32 = 0x1F25;

// coordinates in the QR symbol where to write format and version bits, most significant
// bit first. Negative offsets count from the right or bottom edge.
static VERSION_INFO_COORDS_BL: [(i16, i16); 18] = [
    (5, -9), (5, -10), (5, -11),
    (4, -9), (4, -10), (4, -11),
    (3, -9), (3, -10), (3, -11),
    (2, -9), (2, -10), (2, -11),
    (1, -9), (1, -10), (1, -11),
    (0, -9), (0, -10), (0, -11),
];

static VERSION_INFO_COORDS_TR: [(i16, i16); 18] = [
    (-9, 5), (-10, 5), (-11, 5),
    (-9, 4), (-10, 4), (-11, 4),
    (-9, 3), (-10, 3), (-11, 3),
    (-9, 2), (-10, 2), (-11, 2),
    (-9, 1), (-10, 1), (-11, 1),
    (-9, 0), (-10, 0), (-11, 0),
];

pub(crate) static FORMAT_INFO_COORDS_MAIN: [(i16, i16); 15] = [
    (0, 8), (1, 8), (2, 8), (3, 8), (4, 8), (5, 8), (7, 8), (8, 8),
    (8, 7), (8, 5), (8, 4), (8, 3), (8, 2), (8, 1), (8, 0),
];

pub(crate) static FORMAT_INFO_COORDS_SIDE: [(i16, i16); 15] = [
    (8, -1), (8, -2), (8, -3), (8, -4), (8, -5), (8, -6), (8, -7), (-8, 8),
    (-7, 8), (-6, 8), (-5, 8), (-4, 8), (-3, 8), (-2, 8), (-1, 8),
];

/// Resolve a coordinate from the tables above for a symbol of the given size
pub(crate) fn resolve_coord((xoff, yoff): (i16, i16), size: usize) -> (usize, usize) {
    let resolve = |off: i16| if off < 0 { size - off.unsigned_abs() as usize } else { off as usize };
    (resolve(xoff), resolve(yoff))
}

// helper function to write format or version bits to given coordinates in the symbol.
// bits are written big-endian, num_bits is how many bits to write.
fn insert_bits_at(symbol: &mut Canvas, bits: u32, num_bits: u32, coords: &[(i16, i16)]) {
    let mut mask = 1 << (num_bits - 1);

    for &coord in coords {
        let (x, y) = resolve_coord(coord, symbol.size);
        symbol.set_function(x, y, (mask & bits) != 0);
        mask >>= 1;
    }
}

/// Remainder of value * x^degree divided by the generator polynomial, over GF(2)
fn bch_remainder(value: u32, generator: u32, degree: u32) -> u32 {
    let mut v = value << degree;
    for i in (degree..u32::BITS).rev() {
        if v & (1 << i) != 0 {
            v ^= generator << (i - degree);
        }
    }
    v & ((1 << degree) - 1)
}

/// compute the 15 bit long "format info" word, which contains information about the
/// used mask and ECC level (always L here), protected by a BCH(15,5) code
pub fn compute_format_info_bits(mask_pattern: u8) -> u16 {
    let data = (ECC_LEVEL_L_BITS << 3) | (mask_pattern as u32 & 0b111);
    let word = (data << 10) | bch_remainder(data, FORMAT_INFO_GENERATOR, 10);
    (word ^ FORMAT_INFO_MASK) as u16
}

/// compute the 18 bit long "version info" word, protected by a BCH(18,6) code
pub fn compute_version_info_bits(version: u8) -> u32 {
    let data = version as u32;
    (data << 12) | bch_remainder(data, VERSION_INFO_GENERATOR, 12)
}

/// Compute and write both copies of the format bits into the symbol
pub fn insert_format_info(symbol: &mut Canvas, mask_pattern: u8) {
    let format_bits = compute_format_info_bits(mask_pattern) as u32;
    insert_bits_at(symbol, format_bits, 15, &FORMAT_INFO_COORDS_MAIN);
    insert_bits_at(symbol, format_bits, 15, &FORMAT_INFO_COORDS_SIDE);
}

/// Compute and insert both copies of the version info bits into the symbol.
/// Only does something for version 7 symbols and up.
pub fn insert_version_info(symbol: &mut Canvas, info: &VersionInfo) {
    if info.has_version_info() {
        let version_bits = compute_version_info_bits(info.version);
        insert_bits_at(symbol, version_bits, 18, &VERSION_INFO_COORDS_BL);
        insert_bits_at(symbol, version_bits, 18, &VERSION_INFO_COORDS_TR);
    }
}


//-------------------------------------------------------------------
// TESTS
//-------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{lookup_version, VERSION_TABLE};

    fn count_encoding_region(canvas: &Canvas) -> usize {
        canvas.modules.iter().filter(|&&m| m == Module::Empty).count()
    }

    #[test]
    fn test_canvas_sizes() {
        assert_eq!(create_qr_canvas(lookup_version(1).unwrap()).size(), 21);
        assert_eq!(create_qr_canvas(lookup_version(2).unwrap()).size(), 25);
        assert_eq!(create_qr_canvas(lookup_version(10).unwrap()).size(), 57);
    }

    #[test]
    fn test_encoding_region_fits_codewords() {
        // number of data modules from table 1 of the standard, including remainder bits
        let expected = [208, 359, 567, 807, 1079, 1383, 1568, 1936, 2336, 2768];
        for (info, &modules) in VERSION_TABLE.iter().zip(expected.iter()) {
            let canvas = create_qr_canvas(info);
            assert_eq!(count_encoding_region(&canvas), modules, "version {}", info.version);
            assert!(info.total_codewords() * 8 <= modules);
        }
    }

    #[test]
    fn test_finder_pattern() {
        let canvas = create_qr_canvas(lookup_version(1).unwrap());
        let row0: Vec<bool> = (0..8).map(|x| canvas[(x, 0)].is_dark()).collect();
        assert_eq!(row0, [true, true, true, true, true, true, true, false]);
        let row2: Vec<bool> = (0..8).map(|x| canvas[(x, 2)].is_dark()).collect();
        assert_eq!(row2, [true, false, true, true, true, false, true, false]);
        // the separator row below
        assert!((0..8).all(|x| canvas[(x, 7)] == Module::Function(false)));
        // the upper right finder is mirrored
        assert_eq!(canvas[(20, 0)], Module::Function(true));
        assert_eq!(canvas[(13, 0)], Module::Function(false));
    }

    #[test]
    fn test_timing_and_dark_module() {
        let info = lookup_version(3).unwrap();
        let canvas = create_qr_canvas(info);
        for i in 8..info.size - 8 {
            assert_eq!(canvas[(i, 6)], Module::Function(i % 2 == 0));
            assert_eq!(canvas[(6, i)], Module::Function(i % 2 == 0));
        }
        assert_eq!(canvas[(8, info.size - 8)], Module::Function(true));
    }

    #[test]
    fn test_alignment_points() {
        assert!(get_alignment_pattern_points(lookup_version(1).unwrap()).is_empty());
        assert_eq!(get_alignment_pattern_points(lookup_version(2).unwrap()), [(18, 18)]);
        let points = get_alignment_pattern_points(lookup_version(7).unwrap());
        assert_eq!(points.len(), 6);
        assert!(points.contains(&(6, 22)));
        assert!(!points.contains(&(6, 6)));
        assert!(!points.contains(&(38, 6)));
    }

    #[test]
    fn test_placement_path() {
        let path: Vec<(usize, usize)> = placement_path(21).collect();
        // every module except the timing column, once
        assert_eq!(path.len(), 20 * 21);
        assert!(path.iter().all(|&(x, _)| x != 6));
        assert_eq!(&path[..4], [(20, 20), (19, 20), (20, 19), (19, 19)]);
        // second strip runs downwards
        assert_eq!(path[42], (18, 0));
        // after the timing column the strips are shifted by one
        assert!(path.contains(&(5, 0)) && path.contains(&(0, 20)));
    }

    #[test]
    fn test_payload_placement() {
        let info = lookup_version(1).unwrap();
        let mut canvas = create_qr_canvas(info);
        insert_data_payload(&mut canvas, &[0b1010_0000]);
        assert_eq!(count_encoding_region(&canvas), 0);
        assert_eq!(canvas[(20, 20)], Module::Data(true));
        assert_eq!(canvas[(19, 20)], Module::Data(false));
        assert_eq!(canvas[(20, 19)], Module::Data(true));
        // codewords run out early, the rest stays light
        assert_eq!(canvas[(9, 20)], Module::Data(false));
        // function modules are untouched
        assert_eq!(canvas[(0, 0)], Module::Function(true));
    }

    #[test]
    fn test_format_info_table() {
        // level L entries of table C.1 in Annex C
        let expected = [0x77c4, 0x72f3, 0x7daa, 0x789d, 0x662f, 0x6318, 0x6c41, 0x6976];
        for (mask, &word) in expected.iter().enumerate() {
            assert_eq!(compute_format_info_bits(mask as u8), word);
        }
        assert_eq!(FORMAT_INFO_GENERATOR, 0b101_0011_0111);
    }

    #[test]
    fn test_version_info_table() {
        assert_eq!(compute_version_info_bits(7), 0x07c94);
        assert_eq!(compute_version_info_bits(8), 0x085bc);
        assert_eq!(compute_version_info_bits(9), 0x09a99);
        assert_eq!(compute_version_info_bits(10), 0x0a4d3);
    }

    #[test]
    fn test_format_info_copies() {
        let info = lookup_version(1).unwrap();
        let mut canvas = create_qr_canvas(info);
        insert_format_info(&mut canvas, 3);
        let read = |coords: &[(i16, i16)]| {
            coords.iter().fold(0u16, |acc, &c| (acc << 1) | canvas[resolve_coord(c, 21)].is_dark() as u16)
        };
        assert_eq!(read(&FORMAT_INFO_COORDS_MAIN), 0x789d);
        assert_eq!(read(&FORMAT_INFO_COORDS_SIDE), 0x789d);
        // the dark module stays dark
        assert_eq!(canvas[(8, 13)], Module::Function(true));
    }

    #[test]
    fn test_version_info_placement() {
        let info = lookup_version(7).unwrap();
        let mut canvas = create_qr_canvas(info);
        insert_version_info(&mut canvas, info);
        // least significant bit sits in the corner closest to the finder's origin
        let bits = compute_version_info_bits(7);
        for i in 0..18 {
            let dark = (bits >> i) & 1 == 1;
            assert_eq!(canvas[(info.size - 11 + i % 3, i / 3)], Module::Function(dark));
            assert_eq!(canvas[(i / 3, info.size - 11 + i % 3)], Module::Function(dark));
        }
    }
}
