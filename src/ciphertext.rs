// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::fmt;
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::encoding::{from_hex, is_empty_or_zero_hex, to_hex};
use crate::{Error, PaillierModulusSizedNumber, Result};

/// A Paillier ciphertext $ c = g^m \cdot r^N \mod N^2 $.
///
/// On the wire a ciphertext is a `0x`-prefixed big-endian hex string. Whether the value actually lies
/// in $ [0, N^2) $ depends on the key and is checked when the ciphertext is used.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Ciphertext(PaillierModulusSizedNumber);

impl Ciphertext {
    pub fn new(value: PaillierModulusSizedNumber) -> Ciphertext {
        Ciphertext(value)
    }

    /// The trivial encryption of zero, $ g^0 \cdot 1^N = 1 $, which is also the neutral element of
    /// homomorphic aggregation.
    pub fn neutral() -> Ciphertext {
        Ciphertext(PaillierModulusSizedNumber::ONE)
    }

    pub fn value(&self) -> &PaillierModulusSizedNumber {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", to_hex(&self.0))
    }

    pub fn from_hex(value: &str) -> Result<Ciphertext> {
        Ok(Ciphertext(from_hex(value)?))
    }

    /// Parses an aggregate as read from the ledger.
    ///
    /// A slot nobody has voted into reads back as `0x`, `0x0` or an empty string; it is reported as
    /// `None` rather than as a ciphertext, as zero is not a valid encryption of anything.
    pub fn parse_aggregate(value: &str) -> Result<Option<Ciphertext>> {
        if is_empty_or_zero_hex(value) {
            return Ok(None);
        }

        Ciphertext::from_hex(value).map(Some)
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Ciphertext {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ciphertext::from_hex(s)
    }
}

impl Serialize for Ciphertext {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ciphertext {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;

        Ciphertext::from_hex(&value).map_err(D::Error::custom)
    }
}
