// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! The interface to the ledger that stores ballots and keeps the per-candidate aggregates.
//!
//! The ledger itself lives outside this crate; it only ever multiplies ciphertexts and never sees a
//! private key.

use crate::{CandidateId, Ciphertext, EncryptedBallot, Result};

/// Read access to the ledger's aggregate ciphertexts.
///
/// Implementations report read failures as [`Error::LedgerError`](crate::Error::LedgerError).
pub trait AggregateSource {
    /// The aggregate of candidate `candidate_id`, or `None` if no ballot has been accumulated into it.
    fn aggregate_ciphertext(&self, candidate_id: CandidateId) -> Result<Option<Ciphertext>>;

    /// All aggregates, in ballot slot order.
    fn all_aggregate_ciphertexts(&self) -> Result<Vec<Option<Ciphertext>>>;
}

/// Write access to the ledger: accepts one-hot ballots in candidate slot order.
pub trait BallotSink {
    fn submit(&mut self, ballot: EncryptedBallot) -> Result<()>;
}

#[cfg(any(test, feature = "test_exports"))]
pub mod test_exports {
    use crate::{
        AggregateSource, BallotSink, CandidateId, CandidateSet, Ciphertext, EncryptedBallot, Error,
        PublicKey, Result, SanityCheckError,
    };

    /// An in-memory stand-in for the ledger, accumulating ballots slot by slot.
    #[derive(Clone, Debug)]
    pub struct MemoryLedger {
        public_key: PublicKey,
        candidates: CandidateSet,
        aggregates: Vec<Option<Ciphertext>>,
        ballots: usize,
    }

    impl MemoryLedger {
        pub fn new(public_key: PublicKey, candidates: CandidateSet) -> MemoryLedger {
            let aggregates = vec![None; candidates.len()];

            MemoryLedger {
                public_key,
                candidates,
                aggregates,
                ballots: 0,
            }
        }

        pub fn candidates(&self) -> &CandidateSet {
            &self.candidates
        }

        pub fn number_of_ballots(&self) -> usize {
            self.ballots
        }

        /// Overwrites the aggregate of `candidate_id`, as a tampering ledger would.
        pub fn set_aggregate(
            &mut self,
            candidate_id: CandidateId,
            aggregate: Option<Ciphertext>,
        ) -> Result<()> {
            let position = self
                .candidates
                .position(candidate_id)
                .ok_or(SanityCheckError::UnknownCandidate(candidate_id))?;

            self.aggregates[position] = aggregate;

            Ok(())
        }
    }

    impl BallotSink for MemoryLedger {
        fn submit(&mut self, ballot: EncryptedBallot) -> Result<()> {
            if ballot.len() != self.candidates.len() {
                return Err(Error::CountMismatch {
                    expected: self.candidates.len(),
                    actual: ballot.len(),
                });
            }

            let aggregates = self
                .aggregates
                .iter()
                .zip(ballot.ciphertexts())
                .map(|(aggregate, ciphertext)| match aggregate {
                    Some(aggregate) => self.public_key.add(aggregate, ciphertext).map(Some),
                    None => Ok(Some(*ciphertext)),
                })
                .collect::<Result<Vec<_>>>()?;

            self.aggregates = aggregates;
            self.ballots += 1;

            Ok(())
        }
    }

    impl AggregateSource for MemoryLedger {
        fn aggregate_ciphertext(&self, candidate_id: CandidateId) -> Result<Option<Ciphertext>> {
            let position = self
                .candidates
                .position(candidate_id)
                .ok_or(SanityCheckError::UnknownCandidate(candidate_id))?;

            Ok(self.aggregates[position])
        }

        fn all_aggregate_ciphertexts(&self) -> Result<Vec<Option<Ciphertext>>> {
            Ok(self.aggregates.clone())
        }
    }
}
