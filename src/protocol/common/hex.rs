use btoi::{btou_radix, ParseIntegerError};
use num_traits::{CheckedAdd, CheckedMul, FromPrimitive, Zero};

/// Parse an ascii-hex integer (no `0x` prefix, any length up to the
/// integer's width).
#[inline]
pub fn decode_hex<I>(buf: &[u8]) -> Result<I, ParseIntegerError>
where
    I: FromPrimitive + Zero + CheckedAdd + CheckedMul,
{
    btou_radix(buf, 16)
}

#[derive(Debug, PartialEq, Eq)]
pub enum DecodeHexError {
    NotAscii,
    NotEvenLen,
    /// More than 8 hex digits where a 32-bit word was expected.
    WordTooLong,
}

fn ascii2byte(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode a GDB hex string into raw bytes.
pub fn decode_hex_buf(buf: &[u8]) -> Result<Vec<u8>, DecodeHexError> {
    use DecodeHexError::*;

    if buf.len() % 2 != 0 {
        return Err(NotEvenLen);
    }

    buf.chunks_exact(2)
        .map(|c| {
            let hi = ascii2byte(c[0]).ok_or(NotAscii)?;
            let lo = ascii2byte(c[1]).ok_or(NotAscii)?;
            Ok(hi << 4 | lo)
        })
        .collect()
}

/// Convert an ascii-hex string into the 4 little-endian bytes the target
/// monitor expects on the wire.
///
/// The string is left-padded with `0` to 8 digits, decoded into a 32-bit
/// value (big-endian digit order when `big_endian_input`, little-endian
/// otherwise), and serialised little-endian. GDB transmits addresses and
/// sizes in natural big-endian text; the little-endian path passes values
/// that are already in target byte order (the `P` register-write payload)
/// through unchanged.
pub fn target_word(hex: &[u8], big_endian_input: bool) -> Result<[u8; 4], DecodeHexError> {
    if hex.len() > 8 {
        return Err(DecodeHexError::WordTooLong);
    }

    let mut padded = [b'0'; 8];
    padded[8 - hex.len()..].copy_from_slice(hex);

    let decoded: [u8; 4] = decode_hex_buf(&padded)?
        .try_into()
        .map_err(|_| DecodeHexError::NotEvenLen)?;

    let value = if big_endian_input {
        u32::from_be_bytes(decoded)
    } else {
        u32::from_le_bytes(decoded)
    };

    Ok(value.to_le_bytes())
}
