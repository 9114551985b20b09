// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::fmt;

use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::to_u64;
use crate::{
    AsNaturalNumber, AsRingElement, Ciphertext, Error, LargeBiPrimeSizedNumber,
    PaillierModulusSizedNumber, PublicKey, Result, SanityCheckError,
};

/// The Paillier secret $ (\lambda, \mu) $, bound to the [`PublicKey`] it decrypts for.
///
/// Both secret values are wiped from memory when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    public_key: PublicKey,
    lambda: LargeBiPrimeSizedNumber,
    mu: LargeBiPrimeSizedNumber,
}

impl PrivateKey {
    /// Binds $ (\lambda, \mu) $ to `public_key`.
    ///
    /// Checks that both lie in $ (0, N) $ and that $ L(g^\lambda \mod N^2) \cdot \mu \equiv 1 \mod N $,
    /// which is exactly the condition for decryption to invert encryption under this public key.
    pub fn new(
        public_key: PublicKey,
        lambda: LargeBiPrimeSizedNumber,
        mu: LargeBiPrimeSizedNumber,
    ) -> Result<PrivateKey> {
        let n = *public_key.n();
        if lambda == LargeBiPrimeSizedNumber::ZERO
            || lambda >= n
            || mu == LargeBiPrimeSizedNumber::ZERO
            || mu >= n
        {
            return Err(SanityCheckError::InvalidPrivateKey.into());
        }

        let private_key = PrivateKey {
            public_key,
            lambda,
            mu,
        };

        let g_to_the_lambda = private_key.exponentiate_by_lambda(private_key.public_key.g());
        let binding = private_key
            .public_key
            .l_function(&g_to_the_lambda)
            .map(|l| private_key.multiply_by_mu(&l));

        if binding != Some(LargeBiPrimeSizedNumber::ONE) {
            return Err(SanityCheckError::InvalidPrivateKey.into());
        }

        Ok(private_key)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// $ m = L(c^\lambda \mod N^2) \cdot \mu \mod N $
    ///
    /// Fails with [`Error::DecryptionIntegrityError`] when `ciphertext` is not in $ [1, N^2) $ or
    /// when $ c^\lambda - 1 $ is not divisible by $ N $; neither happens for an honest product of
    /// encryptions under this key.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<LargeBiPrimeSizedNumber> {
        let c = ciphertext.value();
        if *c == PaillierModulusSizedNumber::ZERO || c >= self.public_key.n2() {
            return Err(Error::DecryptionIntegrityError { candidate_id: None });
        }

        let c_to_the_lambda = self.exponentiate_by_lambda(c);

        let l = self
            .public_key
            .l_function(&c_to_the_lambda)
            .ok_or(Error::DecryptionIntegrityError { candidate_id: None })?;

        Ok(self.multiply_by_mu(&l))
    }

    /// Decrypts a count, which must fit in a `u64`.
    pub fn decrypt_u64(&self, ciphertext: &Ciphertext) -> Result<u64> {
        let plaintext = self.decrypt(ciphertext)?;

        to_u64(&plaintext).ok_or(Error::AggregateOverflowOrTamper { candidate_id: None })
    }

    fn exponentiate_by_lambda(&self, base: &PaillierModulusSizedNumber) -> PaillierModulusSizedNumber {
        base.as_ring_element(self.public_key.n2_params())
            .pow_bounded_exp(&self.lambda, self.public_key.bit_length())
            .as_natural_number()
    }

    fn multiply_by_mu(&self, l: &LargeBiPrimeSizedNumber) -> LargeBiPrimeSizedNumber {
        let n_params = self.public_key.n_params();

        (l.as_ring_element(n_params) * self.mu.as_ring_element(n_params)).as_natural_number()
    }

    pub(crate) fn lambda(&self) -> &LargeBiPrimeSizedNumber {
        &self.lambda
    }

    pub(crate) fn mu(&self) -> &LargeBiPrimeSizedNumber {
        &self.mu
    }
}

impl ConstantTimeEq for PrivateKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        Choice::from(u8::from(self.public_key == other.public_key))
            & self.lambda.ct_eq(&other.lambda)
            & self.mu.ct_eq(&other.mu)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
