//! Error types for encoding and rendering

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrError {
    /// The input could not be read as text.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The transcoded input does not fit into the largest supported version.
    #[error("Input too long: {len} bytes, at most {max} bytes fit into version 10-L")]
    CapacityExceeded { len: usize, max: usize },

    /// Render options rejected before any encoding work happened.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Bitstream error: {0}")]
    Bitstream(#[from] std::io::Error),
}

pub type Result<T, E = QrError> = std::result::Result<T, E>;
