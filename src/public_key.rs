// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::{rand_core::CryptoRngCore, NonZero, RandomMod};
use serde::{Deserialize, Serialize};

use crate::arithmetic::invert;
use crate::encoding::{from_hex, to_hex};
use crate::keypair::MINIMUM_MODULUS_BITS;
use crate::{
    AsNaturalNumber, AsRingElement, Ciphertext, Error, LargeBiPrimeSizedNumber,
    PaillierModulusSizedNumber, PaillierRingElement, PaillierRingParams, PlaintextRingParams,
    Result, SanityCheckError,
};

/// The public parameters $ (N, g) $ of the Paillier cryptosystem.
///
/// Immutable once constructed; the Montgomery parameters for $ N $ and $ N^2 $ are computed once here
/// and shared by every encryption and decryption under this key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyParameters", into = "PublicKeyParameters")]
pub struct PublicKey {
    n: LargeBiPrimeSizedNumber,
    g: PaillierModulusSizedNumber,
    n2: PaillierModulusSizedNumber,
    bit_length: usize,
    standard_generator: bool,
    n_params: PlaintextRingParams,
    n2_params: PaillierRingParams,
}

impl PublicKey {
    /// Validates that `n` is an odd modulus of at least [`MINIMUM_MODULUS_BITS`] bits and that `g` is
    /// a unit of $ \mathbb{Z}_{N^2}^* $.
    ///
    /// Whether the order of `g` is a multiple of $ N $ cannot be checked without the factorization;
    /// [`PrivateKey::new`](crate::PrivateKey::new) rejects keys for which it is not.
    pub fn new(n: LargeBiPrimeSizedNumber, g: PaillierModulusSizedNumber) -> Result<PublicKey> {
        let bit_length = n.bits_vartime();
        if bit_length < MINIMUM_MODULUS_BITS {
            return Err(SanityCheckError::InvalidPublicKey.into());
        }

        // `DynResidueParams` require an odd modulus, which also rules out even `n`.
        #[allow(deprecated)]
        let n_params: Option<PlaintextRingParams> = PlaintextRingParams::new_checked(&n).into();
        let n_params = n_params.ok_or(SanityCheckError::InvalidPublicKey)?;

        let n2: PaillierModulusSizedNumber = n.square();
        #[allow(deprecated)]
        let n2_params: Option<PaillierRingParams> = PaillierRingParams::new_checked(&n2).into();
        let n2_params = n2_params.ok_or(SanityCheckError::InvalidPublicKey)?;

        if g == PaillierModulusSizedNumber::ZERO
            || g >= n2
            || bool::from(invert(&g, &n2_params).is_none())
        {
            return Err(SanityCheckError::InvalidPublicKey.into());
        }

        let n_wide: PaillierModulusSizedNumber = n.resize();
        let standard_generator = g == n_wide.wrapping_add(&PaillierModulusSizedNumber::ONE);

        Ok(PublicKey {
            n,
            g,
            n2,
            bit_length,
            standard_generator,
            n_params,
            n2_params,
        })
    }

    /// A public key with the generator $ g = N + 1 $.
    pub fn with_standard_generator(n: LargeBiPrimeSizedNumber) -> Result<PublicKey> {
        let n_wide: PaillierModulusSizedNumber = n.resize();

        PublicKey::new(n, n_wide.wrapping_add(&PaillierModulusSizedNumber::ONE))
    }

    pub fn n(&self) -> &LargeBiPrimeSizedNumber {
        &self.n
    }

    pub fn g(&self) -> &PaillierModulusSizedNumber {
        &self.g
    }

    pub fn n2(&self) -> &PaillierModulusSizedNumber {
        &self.n2
    }

    /// The bit length of $ N $, which bounds every exponentiation under this key.
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    pub(crate) fn n_params(&self) -> &PlaintextRingParams {
        &self.n_params
    }

    pub(crate) fn n2_params(&self) -> &PaillierRingParams {
        &self.n2_params
    }

    /// Encrypts `plaintext` under a fresh randomizer drawn from `rng`.
    pub fn encrypt(
        &self,
        plaintext: &LargeBiPrimeSizedNumber,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Ciphertext> {
        let randomness = self.sample_randomness(rng)?;

        self.encrypt_with_randomness(plaintext, &randomness)
    }

    pub fn encrypt_u64(&self, plaintext: u64, rng: &mut impl CryptoRngCore) -> Result<Ciphertext> {
        self.encrypt(&LargeBiPrimeSizedNumber::from(plaintext), rng)
    }

    /// Samples a randomizer $ r \in \mathbb{Z}_N^* $.
    ///
    /// Classic rejection sampling: draws uniformly from $ [0, N) $ until the draw is invertible
    /// modulo $ N $, i.e. $ gcd(r, N) = 1 $ (which also excludes zero).
    pub(crate) fn sample_randomness(
        &self,
        rng: &mut impl CryptoRngCore,
    ) -> Result<LargeBiPrimeSizedNumber> {
        let modulus: Option<NonZero<LargeBiPrimeSizedNumber>> = NonZero::new(self.n).into();
        let modulus = modulus.ok_or(Error::InternalError)?;

        loop {
            let randomness = LargeBiPrimeSizedNumber::random_mod(rng, &modulus);

            if bool::from(invert(&randomness, &self.n_params).is_some()) {
                return Ok(randomness);
            }
        }
    }

    /// $ c = g^m \cdot r^N \mod N^2 $, where $ g^m = (1 + m \cdot N) \mod N^2 $ for $ g = N + 1 $.
    pub(crate) fn encrypt_with_randomness(
        &self,
        plaintext: &LargeBiPrimeSizedNumber,
        randomness: &LargeBiPrimeSizedNumber,
    ) -> Result<Ciphertext> {
        if *plaintext >= self.n {
            return Err(Error::InvalidPlaintext);
        }

        let plaintext: PaillierModulusSizedNumber = plaintext.resize();
        let randomness: PaillierModulusSizedNumber = randomness.resize();
        let m: PaillierRingElement = plaintext.as_ring_element(&self.n2_params);
        let r: PaillierRingElement = randomness.as_ring_element(&self.n2_params);

        let g_to_the_m = if self.standard_generator {
            let n: PaillierModulusSizedNumber = self.n.resize();
            let n: PaillierRingElement = n.as_ring_element(&self.n2_params);
            let one = PaillierRingElement::one(self.n2_params);

            // $ (m*N + 1) $
            m * n + one
        } else {
            self.g
                .as_ring_element(&self.n2_params)
                .pow_bounded_exp(&plaintext, self.bit_length)
        };

        // $ * (r^N) mod N^2 $
        let ciphertext = g_to_the_m * r.pow_bounded_exp(&self.n, self.bit_length);

        Ok(Ciphertext::new(ciphertext.as_natural_number()))
    }

    /// $ Enc(m_1) \cdot Enc(m_2) \mod N^2 = Enc(m_1 + m_2 \mod N) $
    pub fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        self.ensure_in_ciphertext_space(lhs)?;
        self.ensure_in_ciphertext_space(rhs)?;

        let product = lhs.value().as_ring_element(&self.n2_params)
            * rhs.value().as_ring_element(&self.n2_params);

        Ok(Ciphertext::new(product.as_natural_number()))
    }

    /// Homomorphically sums `ciphertexts`; the sum of nothing is [`Ciphertext::neutral()`].
    pub fn aggregate<'a>(
        &self,
        ciphertexts: impl IntoIterator<Item = &'a Ciphertext>,
    ) -> Result<Ciphertext> {
        ciphertexts
            .into_iter()
            .try_fold(Ciphertext::neutral(), |acc, ciphertext| {
                self.add(&acc, ciphertext)
            })
    }

    fn ensure_in_ciphertext_space(&self, ciphertext: &Ciphertext) -> Result<()> {
        if *ciphertext.value() == PaillierModulusSizedNumber::ZERO || *ciphertext.value() >= self.n2
        {
            return Err(SanityCheckError::InvalidCiphertext.into());
        }

        Ok(())
    }

    /// $ L(x) = \frac{x - 1}{N} $, or `None` when the division is not exact.
    pub(crate) fn l_function(
        &self,
        x: &PaillierModulusSizedNumber,
    ) -> Option<LargeBiPrimeSizedNumber> {
        let n: PaillierModulusSizedNumber = self.n.resize();
        let n: Option<NonZero<PaillierModulusSizedNumber>> = NonZero::new(n).into();
        let n = n?;

        if *x == PaillierModulusSizedNumber::ZERO {
            return None;
        }

        let x_minus_one = x.wrapping_sub(&PaillierModulusSizedNumber::ONE);
        if x_minus_one % n != PaillierModulusSizedNumber::ZERO {
            return None;
        }

        // $ x < N^2 $, so the quotient is smaller than $ N $.
        Some((x_minus_one / n).resize())
    }
}

/// The public key as exchanged over configuration: two big-endian hex strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyParameters {
    pub n: String,
    pub g: String,
}

impl TryFrom<PublicKeyParameters> for PublicKey {
    type Error = Error;

    fn try_from(parameters: PublicKeyParameters) -> Result<Self> {
        PublicKey::new(from_hex(&parameters.n)?, from_hex(&parameters.g)?)
    }
}

impl From<PublicKey> for PublicKeyParameters {
    fn from(public_key: PublicKey) -> Self {
        PublicKeyParameters {
            n: format!("0x{}", to_hex(&public_key.n)),
            g: format!("0x{}", to_hex(&public_key.g)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use rand::{rngs::StdRng, SeedableRng};
    use rand_core::OsRng;
    use rstest::rstest;

    use super::*;
    use crate::test_exports::{private_key, public_key, CIPHERTEXT, N, PLAINTEXT, RANDOMNESS};

    #[test]
    fn encrypts() {
        let public_key = PublicKey::with_standard_generator(N).unwrap();

        assert_eq!(
            public_key
                .encrypt_with_randomness(&PLAINTEXT, &RANDOMNESS)
                .unwrap(),
            Ciphertext::new(CIPHERTEXT)
        );
    }

    #[test]
    fn encrypts_with_an_explicit_generator() {
        let n_wide: PaillierModulusSizedNumber = N.resize();
        let g = n_wide.wrapping_add(&PaillierModulusSizedNumber::ONE);
        let public_key = PublicKey::new(N, g).unwrap();

        assert_eq!(public_key, PublicKey::with_standard_generator(N).unwrap());
        assert_eq!(
            public_key
                .encrypt_with_randomness(&PLAINTEXT, &RANDOMNESS)
                .unwrap(),
            Ciphertext::new(CIPHERTEXT)
        );
    }

    #[test]
    fn generic_generator_path_agrees_with_closed_form() {
        let public_key = public_key();
        let mut generic = public_key.clone();
        generic.standard_generator = false;

        for m in [0u64, 1, 2, 1 << 20] {
            let m = LargeBiPrimeSizedNumber::from(m);
            assert_eq!(
                generic.encrypt_with_randomness(&m, &RANDOMNESS).unwrap(),
                public_key.encrypt_with_randomness(&m, &RANDOMNESS).unwrap()
            );
        }
    }

    #[test]
    fn rejects_plaintexts_outside_of_the_plaintext_space() {
        let public_key = public_key();

        assert_eq!(
            public_key.encrypt(&N, &mut OsRng),
            Err(Error::InvalidPlaintext)
        );
        assert_eq!(
            public_key.encrypt(&LargeBiPrimeSizedNumber::MAX, &mut OsRng),
            Err(Error::InvalidPlaintext)
        );
    }

    #[test]
    fn encryptions_of_the_same_plaintext_differ() {
        let public_key = public_key();

        let ciphertexts: Vec<_> = (0..8)
            .map(|_| public_key.encrypt_u64(0, &mut OsRng).unwrap())
            .collect();

        for (i, lhs) in ciphertexts.iter().enumerate() {
            for rhs in &ciphertexts[i + 1..] {
                assert_ne!(lhs, rhs);
            }
        }
    }

    #[test]
    fn seeded_randomness_is_reproducible() {
        let public_key = public_key();

        let first = public_key
            .encrypt(&PLAINTEXT, &mut StdRng::seed_from_u64(7))
            .unwrap();
        let second = public_key
            .encrypt(&PLAINTEXT, &mut StdRng::seed_from_u64(7))
            .unwrap();
        let other_seed = public_key
            .encrypt(&PLAINTEXT, &mut StdRng::seed_from_u64(8))
            .unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other_seed);
    }

    #[test]
    fn samples_units() {
        let public_key = public_key();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..16 {
            let r = public_key.sample_randomness(&mut rng).unwrap();
            assert_ne!(r, LargeBiPrimeSizedNumber::ZERO);
            assert!(r < N);
        }
    }

    #[rstest]
    #[case(3, 5, 8)]
    #[case(0, 0, 0)]
    #[case(0, 1, 1)]
    #[case(1_000_000, 1, 1_000_001)]
    fn adds_homomorphically(#[case] m1: u64, #[case] m2: u64, #[case] expected: u64) {
        let private_key = private_key();
        let public_key = private_key.public_key();

        let sum = public_key
            .add(
                &public_key.encrypt_u64(m1, &mut OsRng).unwrap(),
                &public_key.encrypt_u64(m2, &mut OsRng).unwrap(),
            )
            .unwrap();

        assert_eq!(private_key.decrypt_u64(&sum).unwrap(), expected);
    }

    #[test]
    fn addition_wraps_around_the_modulus() {
        let private_key = private_key();
        let public_key = private_key.public_key();
        let n_minus_one = N.wrapping_sub(&LargeBiPrimeSizedNumber::ONE);

        let sum = public_key
            .add(
                &public_key.encrypt(&n_minus_one, &mut OsRng).unwrap(),
                &public_key.encrypt_u64(2, &mut OsRng).unwrap(),
            )
            .unwrap();

        assert_eq!(
            private_key.decrypt(&sum).unwrap(),
            LargeBiPrimeSizedNumber::ONE
        );
    }

    #[test]
    fn aggregates() {
        let private_key = private_key();
        let public_key = private_key.public_key();

        let ciphertexts: Vec<_> = [1u64, 0, 1, 1, 0]
            .into_iter()
            .map(|m| public_key.encrypt_u64(m, &mut OsRng).unwrap())
            .collect();

        let aggregate = public_key.aggregate(&ciphertexts).unwrap();
        assert_eq!(private_key.decrypt_u64(&aggregate).unwrap(), 3);

        assert_eq!(
            public_key.aggregate(&Vec::new()).unwrap(),
            Ciphertext::neutral()
        );
    }

    #[test]
    fn refuses_to_add_ciphertexts_outside_of_the_ciphertext_space() {
        let public_key = public_key();
        let valid = public_key.encrypt_u64(1, &mut OsRng).unwrap();

        for invalid in [
            Ciphertext::new(PaillierModulusSizedNumber::ZERO),
            Ciphertext::new(*public_key.n2()),
        ] {
            assert_eq!(
                public_key.add(&valid, &invalid),
                Err(Error::SanityCheckError(SanityCheckError::InvalidCiphertext))
            );
        }
    }

    #[test]
    fn encrypts_concurrently() {
        let private_key = private_key();
        let public_key = private_key.public_key();

        let ciphertexts: Vec<Ciphertext> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4u64)
                .map(|m| scope.spawn(move || public_key.encrypt_u64(m, &mut OsRng).unwrap()))
                .collect();

            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (m, ciphertext) in ciphertexts.iter().enumerate() {
            assert_eq!(private_key.decrypt_u64(ciphertext).unwrap(), m as u64);
        }
    }

    #[rstest]
    #[case::even_modulus(LargeBiPrimeSizedNumber::from(1u8).shl_vartime(600), None)]
    #[case::too_short(LargeBiPrimeSizedNumber::from(u64::MAX), None)]
    #[case::zero_generator(N, Some(PaillierModulusSizedNumber::ZERO))]
    #[case::generator_too_large(N, Some(N.square()))]
    #[case::generator_not_a_unit(N, Some(N.resize()))]
    fn rejects_invalid_public_keys(
        #[case] n: LargeBiPrimeSizedNumber,
        #[case] g: Option<PaillierModulusSizedNumber>,
    ) {
        let g = g.unwrap_or_else(|| {
            n.resize::<{ PaillierModulusSizedNumber::LIMBS }>()
                .wrapping_add(&PaillierModulusSizedNumber::ONE)
        });

        assert_eq!(
            PublicKey::new(n, g),
            Err(Error::SanityCheckError(SanityCheckError::InvalidPublicKey))
        );
    }

    #[test]
    fn serializes_as_hex_parameters() {
        let public_key = public_key();

        let serialized = serde_json::to_value(&public_key).unwrap();
        assert_eq!(serialized["n"], format!("0x{}", to_hex(&N)));
        assert_eq!(
            serialized["g"],
            format!("0x{}", to_hex(public_key.g()))
        );

        let deserialized: PublicKey = serde_json::from_value(serialized).unwrap();
        assert_eq!(deserialized, public_key);
    }
}
