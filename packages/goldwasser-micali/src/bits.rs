//! Canonical byte/bit codec: every byte expands to 8 bits, most significant
//! bit first, bytes concatenated in their original order.

use crate::errors::{Error, Result};

use bitvec::field::BitField;
use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

pub fn bytes_to_bits(bytes: &[u8]) -> BitVec<u8, Msb0> {
    BitVec::from_slice(bytes)
}

/// Packs bits back into bytes.
///
/// # Errors
///
/// [`Error::BitLengthNotByteAligned`] if the number of bits is not a multiple of 8.
pub fn bits_to_bytes(bits: &BitSlice<u8, Msb0>) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(Error::BitLengthNotByteAligned(bits.len()));
    }
    Ok(bits.chunks_exact(8).map(|byte| byte.load_be::<u8>()).collect())
}
