// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    AggregateSource, CandidateId, CandidateSet, Ciphertext, Error, PrivateKey, Result,
    SanityCheckError,
};

/// The number of votes cast for a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    pub candidate_id: CandidateId,
    pub votes: u64,
}

/// Decrypts per-candidate aggregates into vote counts.
///
/// Reconciliation is read-only, so calling it again on the same aggregates yields the same tally.
#[derive(Clone, Copy, Debug)]
pub struct Reconciler<'a> {
    private_key: &'a PrivateKey,
    voter_bound: Option<u64>,
}

impl<'a> Reconciler<'a> {
    pub fn new(private_key: &'a PrivateKey) -> Reconciler<'a> {
        Reconciler {
            private_key,
            voter_bound: None,
        }
    }

    /// Bounds the number of ballots that can have been cast.
    ///
    /// Each ballot adds exactly one vote, so no count and no total may exceed the bound; a tally that
    /// does is reported as [`Error::AggregateOverflowOrTamper`].
    pub fn voter_bound(self, voter_bound: u64) -> Reconciler<'a> {
        Reconciler {
            voter_bound: Some(voter_bound),
            ..self
        }
    }

    /// Reconciles aggregates keyed by candidate id.
    ///
    /// A candidate whose aggregate is `None` has received no votes yet.
    pub fn reconcile(
        &self,
        aggregates: &HashMap<CandidateId, Option<Ciphertext>>,
        candidates: &CandidateSet,
    ) -> Result<Vec<TallyResult>> {
        self.ensure_shape(aggregates.len(), candidates)?;

        if let Some(unknown) = aggregates
            .keys()
            .find(|candidate_id| candidates.position(**candidate_id).is_none())
        {
            return Err(SanityCheckError::UnknownCandidate(*unknown).into());
        }

        // Every key is a known candidate and there are as many keys as candidates, so each candidate
        // has an entry.
        let ordered = candidates
            .ids()
            .map(|candidate_id| {
                aggregates
                    .get(&candidate_id)
                    .copied()
                    .ok_or(Error::InternalError)
            })
            .collect::<Result<Vec<_>>>()?;

        self.decrypt_all(&ordered, candidates)
    }

    /// Reconciles aggregates given in ballot slot order, as the ledger returns them in bulk.
    pub fn reconcile_ordered(
        &self,
        aggregates: &[Option<Ciphertext>],
        candidates: &CandidateSet,
    ) -> Result<Vec<TallyResult>> {
        self.ensure_shape(aggregates.len(), candidates)?;

        self.decrypt_all(aggregates, candidates)
    }

    pub fn reconcile_from(
        &self,
        source: &impl AggregateSource,
        candidates: &CandidateSet,
    ) -> Result<Vec<TallyResult>> {
        let aggregates = source.all_aggregate_ciphertexts()?;

        self.reconcile_ordered(&aggregates, candidates)
    }

    fn ensure_shape(&self, number_of_aggregates: usize, candidates: &CandidateSet) -> Result<()> {
        if number_of_aggregates != candidates.len() {
            tracing::error!(
                expected = candidates.len(),
                actual = number_of_aggregates,
                "aggregate count does not match the candidate set"
            );

            return Err(Error::CountMismatch {
                expected: candidates.len(),
                actual: number_of_aggregates,
            });
        }

        Ok(())
    }

    fn decrypt_all(
        &self,
        aggregates: &[Option<Ciphertext>],
        candidates: &CandidateSet,
    ) -> Result<Vec<TallyResult>> {
        let slots: Vec<(CandidateId, Ciphertext)> = candidates
            .ids()
            .zip(aggregates.iter().copied())
            .map(|(candidate_id, aggregate)| {
                let aggregate = aggregate.unwrap_or_else(|| {
                    tracing::debug!(candidate_id, "no aggregate yet, counting zero votes");

                    Ciphertext::neutral()
                });

                (candidate_id, aggregate)
            })
            .collect();

        #[cfg(not(feature = "parallel"))]
        let iter = slots.iter();
        #[cfg(feature = "parallel")]
        let iter = slots.par_iter();

        let tally = iter
            .map(|(candidate_id, aggregate)| {
                let candidate_id = *candidate_id;

                self.private_key
                    .decrypt_u64(aggregate)
                    .map(|votes| TallyResult {
                        candidate_id,
                        votes,
                    })
                    .map_err(|e| {
                        let e = match e {
                            Error::DecryptionIntegrityError { .. } => {
                                Error::DecryptionIntegrityError {
                                    candidate_id: Some(candidate_id),
                                }
                            }
                            Error::AggregateOverflowOrTamper { .. } => {
                                Error::AggregateOverflowOrTamper {
                                    candidate_id: Some(candidate_id),
                                }
                            }
                            e => e,
                        };

                        tracing::warn!(candidate_id, error = %e, "aggregate failed to decrypt");

                        e
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        self.ensure_within_voter_bound(&tally)?;

        Ok(tally)
    }

    fn ensure_within_voter_bound(&self, tally: &[TallyResult]) -> Result<()> {
        let Some(voter_bound) = self.voter_bound else {
            return Ok(());
        };

        if let Some(result) = tally.iter().find(|result| result.votes > voter_bound) {
            tracing::warn!(
                candidate_id = result.candidate_id,
                votes = result.votes,
                voter_bound,
                "count exceeds the number of voters"
            );

            return Err(Error::AggregateOverflowOrTamper {
                candidate_id: Some(result.candidate_id),
            });
        }

        let total = tally
            .iter()
            .try_fold(0u64, |total, result| total.checked_add(result.votes));

        match total {
            Some(total) if total <= voter_bound => Ok(()),
            _ => {
                tracing::warn!(voter_bound, "total count exceeds the number of voters");

                Err(Error::AggregateOverflowOrTamper { candidate_id: None })
            }
        }
    }
}

/// Decrypts one aggregate per candidate into a tally, in the order of `candidates`.
pub fn reconcile_tally(
    aggregates: &HashMap<CandidateId, Option<Ciphertext>>,
    candidates: &CandidateSet,
    private_key: &PrivateKey,
) -> Result<Vec<TallyResult>> {
    Reconciler::new(private_key).reconcile(aggregates, candidates)
}
