/// Reed-Solomon error correction over GF(256) and the block structure of the
/// codeword stream (splitting into blocks and interleaving them).

use crate::tables::VersionInfo;

use lazy_static::lazy_static;
use tracing::debug;

/// Primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 of the field used by QR codes
const PRIMITIVE_POLYNOMIAL: u16 = 0x11D;

/// Exponent and logarithm tables of GF(256). The exponent table is doubled in
/// length so that a product never needs a modulo on the summed logarithms.
pub struct GaloisField {
    exp: [u8; 512],
    log: [u8; 256],
}

impl GaloisField {
    pub fn new() -> GaloisField {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for i in 0..255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLYNOMIAL;
            }
        }
        for i in 255..512 {
            exp[i] = exp[i - 255];
        }
        GaloisField { exp, log }
    }

    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
    }

    /// alpha^n, alpha being the generator element 2
    pub fn exp(&self, n: usize) -> u8 {
        self.exp[n % 255]
    }

    /// Multiply two polynomials, coefficients ordered from highest degree down
    pub fn poly_mul(&self, p: &[u8], q: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; p.len() + q.len() - 1];
        for (i, &a) in p.iter().enumerate() {
            for (j, &b) in q.iter().enumerate() {
                out[i + j] ^= self.mul(a, b);
            }
        }
        out
    }
}

impl Default for GaloisField {
    fn default() -> Self {
        GaloisField::new()
    }
}

lazy_static! {
    pub static ref GF256: GaloisField = GaloisField::new();
}

/// Computes ecc codewords for blocks of arbitrary length with a fixed
/// number of ecc codewords.
pub struct ReedSolomonEncoder<'a> {
    gf: &'a GaloisField,
    generator: Vec<u8>,
}

impl ReedSolomonEncoder<'static> {
    /// Encoder on the shared field tables
    pub fn new(ecc_len: usize) -> ReedSolomonEncoder<'static> {
        ReedSolomonEncoder::with_field(&GF256, ecc_len)
    }
}

impl<'a> ReedSolomonEncoder<'a> {
    /// The generator polynomial is the product of (x - alpha^i) for i in 0..ecc_len
    pub fn with_field(gf: &'a GaloisField, ecc_len: usize) -> ReedSolomonEncoder<'a> {
        let generator = (0..ecc_len).fold(vec![1u8], |poly, i| gf.poly_mul(&poly, &[1, gf.exp(i)]));
        ReedSolomonEncoder { gf, generator }
    }

    pub fn generator(&self) -> &[u8] {
        &self.generator
    }

    pub fn ecc_len(&self) -> usize {
        self.generator.len() - 1
    }

    /// Remainder of data(x) * x^ecc_len divided by the generator polynomial
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut msg = data.to_vec();
        msg.resize(data.len() + self.ecc_len(), 0);

        for i in 0..data.len() {
            let coef = msg[i];
            if coef == 0 {
                continue;
            }
            for (j, &g) in self.generator.iter().enumerate() {
                msg[i + j] ^= self.gf.mul(g, coef);
            }
        }
        msg.split_off(data.len())
    }
}

/// Split the data codewords into the blocks of both groups. Group 2 blocks
/// follow the group 1 blocks and are one codeword longer.
pub fn split_blocks<'d>(data: &'d [u8], info: &VersionInfo) -> Vec<&'d [u8]> {
    let group1 = (0..info.group1_blocks).map(|b| b * info.group1_data_codewords);
    let group2_start = info.group1_blocks * info.group1_data_codewords;
    let group2 = (0..info.group2_blocks).map(|b| group2_start + b * info.group2_data_codewords);

    group1.map(|start| &data[start..start + info.group1_data_codewords])
        .chain(group2.map(|start| &data[start..start + info.group2_data_codewords]))
        .collect()
}

/// Round robin over the blocks, one codeword each; shorter blocks stop contributing
/// once they are exhausted.
fn interleave<T: AsRef<[u8]>>(blocks: &[T], out: &mut Vec<u8>) {
    let longest = blocks.iter().map(|b| b.as_ref().len()).max().unwrap_or(0);
    for i in 0..longest {
        out.extend(blocks.iter().filter_map(|b| b.as_ref().get(i)));
    }
}

/// Compute the ecc codewords for each block and interleave data and ecc codewords
/// into the final codeword sequence placed into the symbol.
pub fn construct_codewords(data: &[u8], info: &VersionInfo) -> Vec<u8> {
    let encoder = ReedSolomonEncoder::new(info.ecc_per_block);
    let blocks = split_blocks(data, info);
    let ecc_blocks: Vec<Vec<u8>> = blocks.iter().map(|block| encoder.encode(block)).collect();

    debug!(version = info.version,
           blocks = blocks.len(),
           ecc_per_block = info.ecc_per_block,
           "computed error correction codewords");

    let mut codewords = Vec::with_capacity(info.total_codewords());
    interleave(&blocks, &mut codewords);
    interleave(&ecc_blocks, &mut codewords);
    codewords
}
