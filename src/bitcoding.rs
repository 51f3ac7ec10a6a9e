use crate::error::{QrError, Result};
use crate::tables::VersionInfo;

use std::io;

use bitstream_io::{BitWriter, BitWrite, BigEndian};

type QrBitWriter<'a> = BitWriter<&'a mut Vec<u8>, BigEndian>;

/// Mode indicator of the byte encoding in standard symbols
const MODE_BYTES: u32 = 0b0100;

/// Standard symbols use a terminator of up to four zero bits
const TERMINATOR_LENGTH: usize = 4;

/// Pad codewords, appended alternately until the data capacity is reached
const PAD_CODEWORDS: [u8; 2] = [0xEC, 0x11];


fn write_mode_indicator(stream: &mut QrBitWriter) -> io::Result<()> {
    stream.write(4, MODE_BYTES)
}

fn write_charcount_indicator(stream: &mut QrBitWriter, count: u32, info: &VersionInfo) -> io::Result<()> {
    stream.write(info.char_count_bits(), count)
}

fn encode_byte_data(stream: &mut QrBitWriter, input: &[u8]) -> io::Result<()> {
    // bytes are written as they are, most significant bit first
    for &l in input {
        stream.write(8, l)?;
    }
    Ok(())
}

/// Write a byte mode segment (mode indicator, character count and data) to the stream.
/// Returns the number of bits written.
pub fn encode_data_segment(stream: &mut QrBitWriter, input: &[u8], info: &VersionInfo) -> io::Result<usize> {
    write_mode_indicator(stream)?;
    write_charcount_indicator(stream, input.len() as u32, info)?;
    encode_byte_data(stream, input)?;
    Ok(4 + info.char_count_bits() as usize + 8 * input.len())
}

/// Write the terminator if there is still room for it (shortened when fewer than
/// four bits remain) and fill up with zeroes to the next codeword boundary.
fn write_terminator(stream: &mut QrBitWriter, bits_written: usize, info: &VersionInfo) -> io::Result<()> {
    let remaining = (info.data_codewords * 8).saturating_sub(bits_written);
    let terminator = remaining.min(TERMINATOR_LENGTH) as u32;
    if terminator > 0 {
        stream.write(terminator, 0u8)?;
    }
    stream.byte_align()
}

/// Assemble the data codewords for `input` in the given version: the segment,
/// terminator, zero bits up to the byte boundary and the alternating pad codewords.
pub fn build_data_codewords(input: &[u8], info: &VersionInfo) -> Result<Vec<u8>> {
    if input.len() > info.capacity {
        return Err(QrError::CapacityExceeded { len: input.len(), max: info.capacity });
    }

    let mut data: Vec<u8> = Vec::with_capacity(info.data_codewords);
    {
        let mut stream = QrBitWriter::new(&mut data);
        let bits = encode_data_segment(&mut stream, input, info)?;
        write_terminator(&mut stream, bits, info)?;
    }

    let missing = info.data_codewords - data.len();
    data.extend(PAD_CODEWORDS.iter().cycle().take(missing));
    Ok(data)
}
