// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! Secret, single-choice ballots tallied under the Paillier cryptosystem.
//!
//! A voter encodes a choice among $k$ candidates as a one-hot vector of $k$ independently randomized
//! Paillier ciphertexts ([`encode_vote`]). The ledger holding the ballots multiplies them slot by slot,
//! which by the additive homomorphism $Enc(m_1) \cdot Enc(m_2) = Enc(m_1 + m_2) \mod N^2$ yields one
//! aggregate ciphertext per candidate without ever decrypting a ballot. Only the holder of the
//! [`PrivateKey`] decrypts the aggregates ([`Reconciler`]), and never an individual ballot.

use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Concat, Uint, U1024};

pub use ballot::{encode_vote, encode_vote_for, EncryptedBallot};
pub use candidate::{Candidate, CandidateId, CandidateSet};
pub use ciphertext::Ciphertext;
pub use config::{
    EnvFragment, PRIVATE_KEY_LAMBDA, PRIVATE_KEY_MU, PUBLIC_KEY_G, PUBLIC_KEY_N,
};
pub use error::{Error, Result, SanityCheckError};
pub use keypair::{KeyPair, MAXIMUM_MODULUS_BITS, MINIMUM_MODULUS_BITS, RECOMMENDED_MODULUS_BITS};
pub use ledger::{AggregateSource, BallotSink};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use tally::{reconcile_tally, Reconciler, TallyResult};

mod arithmetic;
mod ballot;
mod candidate;
mod ciphertext;
mod config;
mod encoding;
mod error;
mod keypair;
mod ledger;
mod private_key;
mod public_key;
mod tally;

/* Types & Trait (impls) around `crypto_bigint` for internal use */

pub type LargePrimeSizedNumber = U1024;
pub type LargeBiPrimeSizedNumber = <LargePrimeSizedNumber as Concat>::Output;
pub type PaillierModulusSizedNumber = <LargeBiPrimeSizedNumber as Concat>::Output;

pub(crate) type PaillierRingElement = DynResidue<{ PaillierModulusSizedNumber::LIMBS }>;
pub(crate) type PaillierRingParams = DynResidueParams<{ PaillierModulusSizedNumber::LIMBS }>;
pub(crate) type PlaintextRingParams = DynResidueParams<{ LargeBiPrimeSizedNumber::LIMBS }>;

pub(crate) trait AsNaturalNumber<const LIMBS: usize> {
    fn as_natural_number(&self) -> Uint<LIMBS>;
}

pub(crate) trait AsRingElement<const LIMBS: usize> {
    fn as_ring_element(&self, params: &DynResidueParams<LIMBS>) -> DynResidue<LIMBS>;
}

impl<const LIMBS: usize> AsNaturalNumber<LIMBS> for DynResidue<LIMBS> {
    fn as_natural_number(&self) -> Uint<LIMBS> {
        self.retrieve()
    }
}

impl<const LIMBS: usize> AsRingElement<LIMBS> for Uint<LIMBS> {
    fn as_ring_element(&self, params: &DynResidueParams<LIMBS>) -> DynResidue<LIMBS> {
        DynResidue::new(self, *params)
    }
}

#[cfg(any(test, feature = "test_exports"))]
pub mod test_exports {
    //! A fixed 1024-bit key and a known-answer encryption under it.

    use super::*;

    pub use crate::ledger::test_exports::MemoryLedger;

    /// $ p $, one prime factor of [`N`].
    pub const P: LargePrimeSizedNumber =
        LargePrimeSizedNumber::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000d6868dbdeab1588e8aa9a6a6c168f93806646bae4ad23f804842dd06354f6f69724e165170643e00ceebd3b3baad2d8ac5bfdf655b85b62172e5ebdd2d5992d1");

    /// $ q $, the other prime factor of [`N`].
    pub const Q: LargePrimeSizedNumber =
        LargePrimeSizedNumber::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000abaff90d1164a9258df55a470d5a2172c59d40d86153a19e55f276700a25a2d311a1fffeb4c67f7157ccf7382c7b2eedccc2c2e1c6cf9ebefb9c4e9a4bf3be05");

    /// $ N = pq $
    pub const N: LargeBiPrimeSizedNumber =
        LargeBiPrimeSizedNumber::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000008fdf575c93de1b0570f4476e843c0c829e678b0292dd3b7b6b02299f2008b798c374d977efea4920f9d93b88c35e44f4a21706958e6c535289c5422cc54acfcce5d83eaee7601d835cbf057220d8c4b6e69d734c58262f661862ddc80d268047aba4369f29a333ce9b1950bb56afa22b1a0ac57fc5b57fcb87c10cbdf519fc15");

    /// $ \lambda = lcm(p - 1, q - 1) $
    pub const LAMBDA: LargeBiPrimeSizedNumber =
        LargeBiPrimeSizedNumber::from_be_hex("000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000023f7d5d724f786c15c3d11dba10f0320a799e2c0a4b74ededac08a67c8022de630dd365dfbfa92483e764ee230d7913d2885c1a5639b14d4a271508b3152b3f2d8e86df8fad286f3d108012114856a8306a6f1b16b001391de8b6294736c5b82c9ed0813c11e1d971d182173dbe1d16ca1e208ce28d80abac64fb4919ef32ad0");

    /// $ \mu = \lambda^{-1} \mod N $
    pub const MU: LargeBiPrimeSizedNumber =
        LargeBiPrimeSizedNumber::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000f24646cecf884ea987f7066224b7517420add68d2a04065972fbca24dd1d8c0348b13cef95a5b716ca74c9c36f8e7ceab7940f18ca8454323e667a45732c3ba006533856bd86a93271c0fd0ca972bfe236160dea446a10a71232b0c3192aa0b0540cd622f954a4e7a831d43dd8454bf365428bce62f3ad2609baba2d649602c");

    pub const PLAINTEXT: LargeBiPrimeSizedNumber =
        LargeBiPrimeSizedNumber::from_be_hex("0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000646fdac89033758399e00d01cdcb413a31fb1c2438f798d5b12b4f8534fe446906f8ab9b6869c8c4c3c15d37e6053d6f2135dd68fa7898fbe33260d90583685c2708cdac3e3bf844316cbb263f406c8c06304717c19f0f3686968b031fcc08f692675ca7427cbbdfc317a0921cab170c6cd9647c2fe7a50abae8c4309ffcc463");

    pub const RANDOMNESS: LargeBiPrimeSizedNumber =
        LargeBiPrimeSizedNumber::from_be_hex("00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000006b50063de1cac57f556fd0e09211aab32da968fe0ebc807263ee29214e4b9dbf4c1a2f3924840481335b6ec44e851649542a772e4221163da9dc90f999d7a59f77565d541ff8e38ed9563b61ec6f14e700e617147781e1b45cc7cf07ae6a3042512e09f9bca64e658a976a5a20942cd76e4f8d047a55890bc70069e4239a1208");

    /// $ (N + 1)^{m} \cdot r^N \mod N^2 $ for [`PLAINTEXT`] and [`RANDOMNESS`]
    pub const CIPHERTEXT: PaillierModulusSizedNumber =
        PaillierModulusSizedNumber::from_be_hex("000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000002ea1b09dd0caf0f2b25ea3228fb3bb1231ee8d7f71ae3de4dcd9bcc6766fe5424e9cd58f0d053f4234fb0f6ec23524b2065740d9b9c55db66684b3dd6a3aa24bf0ec1ca76df5b5540006f5c314ca4bfd3a0e89bb4cc71a7470b58de1d41c0016dcf6caa68da0979b127bd4023ef39c1aea1b6a7539991321a06924472070564d658c02fedce7b48200f191f3feaa94afa28cbc96e0f0930b1cfbc210c31c2021164e968005df3f28c3dad952c771e59791b29c09dcb8b3e1e1cc8cf081d88f7e5a869cca2202f9dc76f1a105cc148eda7eacbbee0d8267422279183564530e7d5fcaf41e10eb24ff607b4a9e9c14edb68c8b9330d81fa7c2a681f938793a6f92");

    pub fn public_key() -> PublicKey {
        PublicKey::with_standard_generator(N).unwrap()
    }

    pub fn private_key() -> PrivateKey {
        PrivateKey::new(public_key(), LAMBDA, MU).unwrap()
    }
}
