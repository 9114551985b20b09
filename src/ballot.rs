// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::rand_core::CryptoRngCore;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    CandidateId, CandidateSet, Ciphertext, Error, LargeBiPrimeSizedNumber, PublicKey, Result,
    SanityCheckError,
};

/// A voter's choice as a one-hot vector of ciphertexts, one per candidate slot.
///
/// Serializes as an ordered array of `0x`-prefixed hex ciphertexts, which is what the ledger accepts as
/// a vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBallot(Vec<Ciphertext>);

impl EncryptedBallot {
    pub fn new(ciphertexts: Vec<Ciphertext>) -> EncryptedBallot {
        EncryptedBallot(ciphertexts)
    }

    pub fn ciphertexts(&self) -> &[Ciphertext] {
        &self.0
    }

    pub fn into_ciphertexts(self) -> Vec<Ciphertext> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_wire(&self) -> Vec<String> {
        self.0.iter().map(Ciphertext::to_hex).collect()
    }
}

/// Encrypts a vote for slot `selected_index` out of `candidate_count`: $ Enc(1) $ at the selected slot
/// and $ Enc(0) $ everywhere else.
///
/// Every slot is encrypted under its own freshly sampled randomizer, so the zero slots are
/// indistinguishable from the selected one without the private key.
pub fn encode_vote(
    selected_index: usize,
    candidate_count: usize,
    public_key: &PublicKey,
    rng: &mut impl CryptoRngCore,
) -> Result<EncryptedBallot> {
    if selected_index >= candidate_count {
        return Err(Error::IndexOutOfRange {
            index: selected_index,
            candidate_count,
        });
    }

    // `rng` is drawn from sequentially; only the exponentiations run in parallel.
    let randomizers: Zeroizing<Vec<LargeBiPrimeSizedNumber>> = Zeroizing::new(
        (0..candidate_count)
            .map(|_| public_key.sample_randomness(rng))
            .collect::<Result<_>>()?,
    );

    #[cfg(not(feature = "parallel"))]
    let iter = randomizers.iter().enumerate();
    #[cfg(feature = "parallel")]
    let iter = randomizers.as_slice().par_iter().enumerate();

    let ciphertexts = iter
        .map(|(slot, randomness)| {
            let plaintext = if slot == selected_index {
                LargeBiPrimeSizedNumber::ONE
            } else {
                LargeBiPrimeSizedNumber::ZERO
            };

            public_key.encrypt_with_randomness(&plaintext, randomness)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EncryptedBallot(ciphertexts))
}

/// Encrypts a vote for the candidate `candidate_id`, laid out in the order of `candidates`.
pub fn encode_vote_for(
    candidate_id: CandidateId,
    candidates: &CandidateSet,
    public_key: &PublicKey,
    rng: &mut impl CryptoRngCore,
) -> Result<EncryptedBallot> {
    let selected_index = candidates
        .position(candidate_id)
        .ok_or(SanityCheckError::UnknownCandidate(candidate_id))?;

    encode_vote(selected_index, candidates.len(), public_key, rng)
}
