//! # qr-canvas
//!
//! Encodes text into a QR code symbol in byte mode at error correction level L,
//! using the smallest of the versions 1 through 10 that holds the UTF-8 encoded
//! text (at most 271 bytes).
//!
//! [`qr_matrix`] returns the bare module grid for callers that draw it themselves,
//! [`qr_image`] draws it onto an [`image::ImageBuffer`].
//!
//! ```
//! use image::Luma;
//! use qr_canvas::{qr_image, qr_matrix, RenderOptions};
//!
//! let matrix = qr_matrix("Hello").unwrap();
//! assert_eq!(matrix.size(), 21);
//!
//! let options = RenderOptions::<Luma<u8>>::default().scale(4.0);
//! let image = qr_image("Hello", &options).unwrap();
//! assert_eq!(image.width(), (21 + 2 * 4) * 4);
//!
//! // 19 bytes no longer fit into version 1 (17 bytes), version 2 is 25 modules wide
//! let image = qr_image("https://example.com", &options).unwrap();
//! assert_eq!(image.width(), (25 + 2 * 4) * 4);
//! ```

use image::{ImageBuffer, Pixel};

pub use config::RenderOptions;
pub use error::{QrError, Result};
pub use matrix::QrMatrix;
pub use render::render;

mod config;
mod error;
mod matrix;
mod render;

pub mod bitcoding;
pub mod rscoding;
pub mod serialization;
pub mod tables;

/// UTF-8 encoding of the text, the bytes that end up in the symbol
pub fn utf8_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Encode raw bytes into a symbol. Fails with [`QrError::CapacityExceeded`] for
/// more than 271 bytes.
pub fn encode_bytes(data: &[u8]) -> Result<QrMatrix> {
    let info = tables::select_version(data.len())?;

    let data_codewords = bitcoding::build_data_codewords(data, info)?;
    let codewords = rscoding::construct_codewords(&data_codewords, info);

    let mut canvas = serialization::create_qr_canvas(info);
    serialization::insert_data_payload(&mut canvas, &codewords);

    // determine best mask, the winner already carries format and version info
    let (mask, symbol) = serialization::masking::apply_best_mask(&canvas, info);

    Ok(QrMatrix::new(info.version, mask, symbol.size(), symbol.to_bits()))
}

/// Encode the text into a symbol
pub fn qr_matrix(text: &str) -> Result<QrMatrix> {
    encode_bytes(&utf8_bytes(text))
}

/// Encode text given as bytes, which have to be valid UTF-8
pub fn qr_matrix_from_utf8(bytes: &[u8]) -> Result<QrMatrix> {
    let text = std::str::from_utf8(bytes).map_err(|e| QrError::InvalidInput(e.to_string()))?;
    qr_matrix(text)
}

/// Encode the text and draw the symbol onto a new image. The options are checked
/// before any encoding happens.
pub fn qr_image<P: Pixel>(
    text: &str,
    options: &RenderOptions<P>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    options.validate()?;
    let matrix = qr_matrix(text)?;
    render(&matrix, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello() {
        let matrix = qr_matrix("Hello").unwrap();
        assert_eq!(matrix.version(), 1);
        assert_eq!(matrix.size(), 21);
        assert!(matrix.mask() < 8);
    }

    #[test]
    fn test_image_width_follows_version() {
        let options = RenderOptions::<image::Luma<u8>>::default().scale(4.0);
        assert_eq!(qr_image("Hello", &options).unwrap().width(), (21 + 2 * 4) * 4);
        // 19 bytes need version 2
        assert_eq!(qr_matrix("https://example.com").unwrap().version(), 2);
        assert_eq!(qr_image("https://example.com", &options).unwrap().width(), (25 + 2 * 4) * 4);
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(qr_matrix_from_utf8(&[0x66, 0xFF, 0x6F]), Err(QrError::InvalidInput(_))));
        assert_eq!(qr_matrix_from_utf8(b"Hello").unwrap(), qr_matrix("Hello").unwrap());
    }

    #[test]
    fn test_utf8_bytes() {
        assert_eq!(utf8_bytes("A"), [0x41]);
        assert_eq!(utf8_bytes("é"), [0xC3, 0xA9]);
        assert_eq!(utf8_bytes("你"), [0xE4, 0xBD, 0xA0]);
        assert_eq!(utf8_bytes("👋"), [0xF0, 0x9F, 0x91, 0x8B]);
        assert!(utf8_bytes("").is_empty());
    }

    #[test]
    fn test_too_long() {
        let text = "x".repeat(272);
        assert!(matches!(qr_matrix(&text), Err(QrError::CapacityExceeded { len: 272, max: 271 })));
        let options = RenderOptions::<image::Luma<u8>>::default();
        assert!(matches!(qr_image(&text, &options), Err(QrError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_config_checked_first() {
        let options = RenderOptions::<image::Luma<u8>>::default().scale(-1.0);
        let text = "x".repeat(300);
        assert!(matches!(qr_image(&text, &options), Err(QrError::InvalidConfiguration(_))));
    }
}
