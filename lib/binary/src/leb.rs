//! LEB128 variable-length integers.
//!
//! Reading is driven by a byte source closure so the same routines serve
//! the byte reader and callers that already consumed the first byte, such
//! as block types. Writing always produces the minimal encoding.

use wasmcodec_types::{ErrorKind, LebPolicy};

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;
const SIGN: u8 = 0x40;

/// The most bytes an integer of `bits` bits may occupy.
pub fn max_len(bits: u32) -> u32 {
    bits.div_ceil(7)
}

/// Reads an unsigned integer of at most `bits` bits.
///
/// Fails with `VarintTooLong` when `max_len(bits)` bytes pass without a
/// terminating byte, or when the last permitted byte carries bits beyond
/// `bits`.
pub fn read_unsigned(
    mut next: impl FnMut() -> Result<u8, ErrorKind>,
    bits: u32,
    policy: LebPolicy,
) -> Result<u64, ErrorKind> {
    debug_assert!((1..=64).contains(&bits));
    let budget = max_len(bits);
    let mut result = 0u64;
    let mut shift = 0;
    let mut index = 0;
    loop {
        let byte = next()?;
        index += 1;
        if index == budget {
            let used = bits - shift;
            if byte & CONTINUATION != 0 || (used < 7 && (byte & PAYLOAD) >> used != 0) {
                return Err(ErrorKind::VarintTooLong);
            }
        }
        result |= u64::from(byte & PAYLOAD) << shift;
        if byte & CONTINUATION == 0 {
            if policy == LebPolicy::Strict && index > 1 && byte == 0 {
                return Err(ErrorKind::NonCanonicalVarint);
            }
            return Ok(result);
        }
        shift += 7;
    }
}

/// Reads a two's-complement signed integer of at most `bits` bits.
///
/// The result is sign-extended from bit 6 of the terminating byte. In the
/// last permitted byte, the bits beyond `bits` must all equal the sign
/// bit, otherwise the value does not fit and `VarintTooLong` is returned.
pub fn read_signed(
    mut next: impl FnMut() -> Result<u8, ErrorKind>,
    bits: u32,
    policy: LebPolicy,
) -> Result<i64, ErrorKind> {
    debug_assert!((1..=64).contains(&bits));
    let budget = max_len(bits);
    let mut result = 0i64;
    let mut shift = 0;
    let mut index = 0;
    let mut previous = 0u8;
    loop {
        let byte = next()?;
        index += 1;
        if index == budget {
            if byte & CONTINUATION != 0 {
                return Err(ErrorKind::VarintTooLong);
            }
            let used = bits - shift;
            if used < 7 {
                // Everything from the sign bit upwards.
                let high = (byte & PAYLOAD) >> (used - 1);
                if high != 0 && high != PAYLOAD >> (used - 1) {
                    return Err(ErrorKind::VarintTooLong);
                }
            }
        }
        result |= i64::from(byte & PAYLOAD) << shift;
        shift += 7;
        if byte & CONTINUATION == 0 {
            if shift < 64 && byte & SIGN != 0 {
                result |= -1i64 << shift;
            }
            if policy == LebPolicy::Strict && index > 1 {
                let redundant = (byte == 0 && previous & SIGN == 0)
                    || (byte == PAYLOAD && previous & SIGN != 0);
                if redundant {
                    return Err(ErrorKind::NonCanonicalVarint);
                }
            }
            return Ok(result);
        }
        previous = byte;
    }
}

/// Appends the minimal encoding of `value`, returning its length.
pub fn write_unsigned(out: &mut Vec<u8>, mut value: u64) -> usize {
    let mut written = 0;
    loop {
        let byte = (value as u8) & PAYLOAD;
        value >>= 7;
        written += 1;
        if value == 0 {
            out.push(byte);
            return written;
        }
        out.push(byte | CONTINUATION);
    }
}

/// Appends the minimal encoding of `value`, returning its length.
pub fn write_signed(out: &mut Vec<u8>, mut value: i64) -> usize {
    let mut written = 0;
    loop {
        let byte = (value as u8) & PAYLOAD;
        value >>= 7;
        written += 1;
        let done = (value == 0 && byte & SIGN == 0) || (value == -1 && byte & SIGN != 0);
        if done {
            out.push(byte);
            return written;
        }
        out.push(byte | CONTINUATION);
    }
}
