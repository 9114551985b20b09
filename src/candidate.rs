// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Result, SanityCheckError};

/// A candidate's ledger identifier.
pub type CandidateId = u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub display_name: String,
}

impl Candidate {
    pub fn new(id: CandidateId, display_name: impl Into<String>) -> Candidate {
        Candidate {
            id,
            display_name: display_name.into(),
        }
    }
}

/// The ordered, non-empty list of candidates of a ballot.
///
/// A candidate's position in the set is the ballot slot that carries votes for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Candidate>", into = "Vec<Candidate>")]
pub struct CandidateSet(Vec<Candidate>);

impl CandidateSet {
    pub fn new(candidates: Vec<Candidate>) -> Result<CandidateSet> {
        if candidates.is_empty() {
            return Err(SanityCheckError::EmptyCandidateSet.into());
        }

        let mut ids = HashSet::with_capacity(candidates.len());
        if let Some(duplicate) = candidates.iter().find(|candidate| !ids.insert(candidate.id)) {
            return Err(SanityCheckError::DuplicateCandidate(duplicate.id).into());
        }

        Ok(CandidateSet(candidates))
    }

    /// Candidates with ids `0..k`, in the order given.
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<CandidateSet> {
        CandidateSet::new(
            names
                .into_iter()
                .zip(0..)
                .map(|(name, id)| Candidate::new(id, name))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = CandidateId> + '_ {
        self.0.iter().map(|candidate| candidate.id)
    }

    /// The ballot slot of candidate `id`.
    pub fn position(&self, id: CandidateId) -> Option<usize> {
        self.0.iter().position(|candidate| candidate.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.0.get(index)
    }
}

impl TryFrom<Vec<Candidate>> for CandidateSet {
    type Error = crate::Error;

    fn try_from(candidates: Vec<Candidate>) -> Result<Self> {
        CandidateSet::new(candidates)
    }
}

impl From<CandidateSet> for Vec<Candidate> {
    fn from(candidates: CandidateSet) -> Self {
        candidates.0
    }
}
