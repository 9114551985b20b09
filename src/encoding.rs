// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! Big-endian hexadecimal representation of unsigned integers, as exchanged with the ledger and
//! stored in key files.

use crypto_bigint::{Encoding, Uint};
use zeroize::Zeroizing;

use crate::{Result, SanityCheckError};

/// Lowercase, even-length hex without a prefix; leading zero bytes are dropped, so zero encodes as
/// `"00"`.
pub(crate) fn to_hex<const LIMBS: usize>(value: &Uint<LIMBS>) -> String
where
    Uint<LIMBS>: Encoding,
{
    let bytes = value.to_be_bytes();
    let bytes: &[u8] = bytes.as_ref();

    let first_significant_byte = bytes
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(bytes.len() - 1);

    hex::encode(&bytes[first_significant_byte..])
}

/// Parses big-endian hex, with or without a `0x` prefix. Odd-length input is read as if it had a
/// leading zero nibble.
pub(crate) fn from_hex<const LIMBS: usize>(value: &str) -> Result<Uint<LIMBS>> {
    let digits = strip_hex_prefix(value.trim());

    if digits.is_empty() {
        return Err(SanityCheckError::MalformedHex("empty value".to_string()).into());
    }

    let digits = if digits.len() % 2 == 1 {
        Zeroizing::new(format!("0{digits}"))
    } else {
        Zeroizing::new(digits.to_string())
    };

    let bytes = Zeroizing::new(
        hex::decode(digits.as_str())
            .map_err(|e| SanityCheckError::MalformedHex(e.to_string()))?,
    );

    let first_significant_byte = bytes
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(bytes.len());
    let significant_bytes = &bytes[first_significant_byte..];

    if significant_bytes.len() > Uint::<LIMBS>::BYTES {
        return Err(SanityCheckError::ValueTooLarge {
            bits: Uint::<LIMBS>::BITS,
        }
        .into());
    }

    let mut buffer = Zeroizing::new(vec![0u8; Uint::<LIMBS>::BYTES]);
    let offset = buffer.len() - significant_bytes.len();
    buffer[offset..].copy_from_slice(significant_bytes);

    Ok(Uint::from_be_slice(&buffer))
}

/// Whether `value` is empty, a bare prefix, or all zeros; the ledger reports untouched slots this way.
pub(crate) fn is_empty_or_zero_hex(value: &str) -> bool {
    strip_hex_prefix(value.trim())
        .chars()
        .all(|digit| digit == '0')
}

/// The value as a `u64`, or `None` when it is wider than 64 bits.
pub(crate) fn to_u64<const LIMBS: usize>(value: &Uint<LIMBS>) -> Option<u64>
where
    Uint<LIMBS>: Encoding,
{
    if value.bits_vartime() > u64::BITS as usize {
        return None;
    }

    let bytes = value.to_be_bytes();
    let bytes: &[u8] = bytes.as_ref();
    let mut low = [0u8; 8];
    low.copy_from_slice(&bytes[bytes.len() - 8..]);

    Some(u64::from_be_bytes(low))
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}
