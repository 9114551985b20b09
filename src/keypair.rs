// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::rand_core::CryptoRngCore;
use crypto_primes::generate_prime_with_rng;
use zeroize::Zeroizing;

use crate::arithmetic::{gcd, invert, lcm};
use crate::{
    Error, LargeBiPrimeSizedNumber, LargePrimeSizedNumber, PrivateKey, PublicKey, Result,
    SanityCheckError,
};

pub const MINIMUM_MODULUS_BITS: usize = 256;
pub const MAXIMUM_MODULUS_BITS: usize = LargeBiPrimeSizedNumber::BITS;
pub const RECOMMENDED_MODULUS_BITS: usize = 2048;

/// Prime pairs are resampled at most this many times before giving up.
const MAXIMUM_ATTEMPTS: usize = 64;

/// A freshly generated Paillier key pair with $ g = N + 1 $.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyPair {
    /// Generates a key pair whose modulus has exactly `bits` bits.
    ///
    /// `bits` must be even and within [`MINIMUM_MODULUS_BITS`] and [`MAXIMUM_MODULUS_BITS`]. Use
    /// [`RECOMMENDED_MODULUS_BITS`] outside of tests.
    pub fn generate(bits: usize, rng: &mut impl CryptoRngCore) -> Result<KeyPair> {
        if bits % 2 != 0 || !(MINIMUM_MODULUS_BITS..=MAXIMUM_MODULUS_BITS).contains(&bits) {
            return Err(SanityCheckError::InvalidKeySize {
                minimum: MINIMUM_MODULUS_BITS,
                maximum: MAXIMUM_MODULUS_BITS,
                actual: bits,
            }
            .into());
        }

        for attempt in 1..=MAXIMUM_ATTEMPTS {
            let p = Zeroizing::new(generate_prime_with_rng::<{ LargePrimeSizedNumber::LIMBS }>(
                rng,
                Some(bits / 2),
            ));
            let q = Zeroizing::new(generate_prime_with_rng::<{ LargePrimeSizedNumber::LIMBS }>(
                rng,
                Some(bits / 2),
            ));

            match KeyPair::from_primes(&p, &q, bits) {
                Ok(key_pair) => {
                    tracing::debug!(bits, attempt, "generated Paillier key pair");

                    return Ok(key_pair);
                }
                Err(Error::KeyGenerationFailure(reason)) => {
                    tracing::debug!(bits, attempt, reason = %reason, "resampling Paillier primes");
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::KeyGenerationFailure(format!(
            "no suitable primes found in {MAXIMUM_ATTEMPTS} attempts"
        )))
    }

    /// Derives the key pair from the primes $ p, q $.
    ///
    /// $ N = pq $ must have exactly `bits` bits and satisfy $ gcd(N, (p-1)(q-1)) = 1 $; then
    /// $ \lambda = lcm(p-1, q-1) $ and $ \mu = \lambda^{-1} \mod N $.
    pub(crate) fn from_primes(
        p: &LargePrimeSizedNumber,
        q: &LargePrimeSizedNumber,
        bits: usize,
    ) -> Result<KeyPair> {
        if p == q {
            return Err(Error::KeyGenerationFailure("p = q".to_string()));
        }

        let p: Zeroizing<LargeBiPrimeSizedNumber> = Zeroizing::new(p.resize());
        let q: Zeroizing<LargeBiPrimeSizedNumber> = Zeroizing::new(q.resize());

        // $ p, q < 2^{1024} $, so none of the products below wrap.
        let n = p.wrapping_mul(&q);
        if n.bits_vartime() != bits {
            return Err(Error::KeyGenerationFailure(format!(
                "modulus has {} bits instead of {bits}",
                n.bits_vartime()
            )));
        }

        let p_minus_one = Zeroizing::new(p.wrapping_sub(&LargeBiPrimeSizedNumber::ONE));
        let q_minus_one = Zeroizing::new(q.wrapping_sub(&LargeBiPrimeSizedNumber::ONE));
        let phi = Zeroizing::new(p_minus_one.wrapping_mul(&q_minus_one));

        if gcd(&n, &*phi) != LargeBiPrimeSizedNumber::ONE {
            return Err(Error::KeyGenerationFailure(
                "modulus is not coprime to its totient".to_string(),
            ));
        }

        let lambda = Zeroizing::new(
            lcm(&*p_minus_one, &*q_minus_one)
                .ok_or_else(|| Error::KeyGenerationFailure("degenerate prime".to_string()))?,
        );

        let public_key = PublicKey::with_standard_generator(n)
            .map_err(|e| Error::KeyGenerationFailure(e.to_string()))?;

        let mu: Option<LargeBiPrimeSizedNumber> = invert(&*lambda, public_key.n_params()).into();
        let mu = Zeroizing::new(mu.ok_or_else(|| {
            Error::KeyGenerationFailure("lambda is not invertible modulo N".to_string())
        })?);

        let private_key = PrivateKey::new(public_key.clone(), *lambda, *mu)
            .map_err(|e| Error::KeyGenerationFailure(e.to_string()))?;

        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.public_key, self.private_key)
    }
}
