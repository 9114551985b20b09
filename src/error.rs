// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crate::CandidateId;

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("plaintext must be smaller than the Paillier modulus")]
    InvalidPlaintext,
    #[error("candidate index {index} is out of range for {candidate_count} candidates")]
    IndexOutOfRange {
        index: usize,
        candidate_count: usize,
    },
    #[error("expected {expected} aggregate ciphertexts, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("ciphertext failed the decryption integrity check (candidate: {candidate_id:?})")]
    DecryptionIntegrityError { candidate_id: Option<CandidateId> },
    #[error("decrypted count is out of the admissible range (candidate: {candidate_id:?})")]
    AggregateOverflowOrTamper { candidate_id: Option<CandidateId> },
    #[error("key generation failed: {0}")]
    KeyGenerationFailure(String),
    /// Returned by [`AggregateSource`](crate::AggregateSource) implementations when the ledger
    /// cannot be read, e.g. an unreachable node or a malformed response.
    #[error("the ledger could not be read: {0}")]
    LedgerError(String),
    #[error("the following sanity-check error occurred: {0}")]
    SanityCheckError(SanityCheckError),
    #[error("an internal error that should never have happened and signifies a bug")]
    InternalError,
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum SanityCheckError {
    #[error("invalid key size: must be an even number of bits in [{minimum}, {maximum}], got {actual}")]
    InvalidKeySize {
        minimum: usize,
        maximum: usize,
        actual: usize,
    },
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("ciphertext is not an element of the ciphertext space")]
    InvalidCiphertext,
    #[error("malformed hexadecimal value: {0}")]
    MalformedHex(String),
    #[error("value does not fit into a {bits}-bit integer")]
    ValueTooLarge { bits: usize },
    #[error("missing configuration value `{0}`")]
    MissingConfiguration(String),
    #[error("malformed configuration line {line}")]
    MalformedConfiguration { line: usize },
    #[error("candidate set must not be empty")]
    EmptyCandidateSet,
    #[error("candidate {0} appears more than once")]
    DuplicateCandidate(CandidateId),
    #[error("candidate {0} is not part of the candidate set")]
    UnknownCandidate(CandidateId),
}

impl From<SanityCheckError> for Error {
    fn from(error: SanityCheckError) -> Self {
        Error::SanityCheckError(error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
