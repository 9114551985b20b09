// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! Command-line front end: sets up a poll's key pair, casts ballots, plays the ledger's aggregation
//! step and tallies the result.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use paillier_tally::{
    encode_vote, CandidateSet, Ciphertext, EncryptedBallot, EnvFragment, KeyPair, PrivateKey,
    PublicKey, Reconciler, PRIVATE_KEY_LAMBDA, PRIVATE_KEY_MU, PUBLIC_KEY_G, PUBLIC_KEY_N,
    RECOMMENDED_MODULUS_BITS,
};
use rand_core::OsRng;
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Tally(#[from] paillier_tally::Error),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Output(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, CliError>;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Secret ballots tallied under the Paillier cryptosystem")]
struct CliArgs {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    #[command(about = "Generate a poll key pair as `.env.public` and `.env.private`")]
    Keygen {
        /// Bit length of the modulus
        #[arg(short, long, default_value_t = RECOMMENDED_MODULUS_BITS)]
        bits: usize,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    #[command(about = "Encrypt a vote and print it as a JSON array of ciphertexts")]
    Vote {
        /// Slot of the selected candidate
        #[arg(short, long)]
        index: usize,
        /// Number of candidates
        #[arg(short, long)]
        candidates: usize,
        /// Public key fragment; read from the environment when omitted
        #[arg(long)]
        public_key: Option<PathBuf>,
    },

    #[command(about = "Multiply ballots slot by slot, as the ledger does")]
    Aggregate {
        /// Ballot files, each a JSON array of ciphertexts
        #[arg(index = 1, required = true)]
        ballots: Vec<PathBuf>,
        #[arg(long)]
        public_key: Option<PathBuf>,
    },

    #[command(about = "Decrypt per-candidate aggregates into vote counts")]
    Tally {
        /// JSON array of aggregate ciphertexts in slot order; `0x` marks an empty slot
        #[arg(short, long)]
        aggregates: PathBuf,
        /// Candidate names in slot order; defaults to one unnamed candidate per aggregate
        #[arg(short, long, value_delimiter = ',')]
        names: Vec<String>,
        /// Number of ballots cast, if known
        #[arg(long)]
        voter_bound: Option<u64>,
        #[arg(long)]
        public_key: Option<PathBuf>,
        /// Private key fragment; read from the environment when omitted
        #[arg(long)]
        private_key: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct TallyLine<'a> {
    candidate_id: u32,
    display_name: &'a str,
    votes: u64,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Select verbosity with env_var: e.g. `RUST_LOG=paillier_tally=debug`
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(args.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");

            ExitCode::FAILURE
        }
    }
}

fn run(cmd: Command) -> Result<()> {
    match cmd {
        Command::Keygen { bits, out_dir } => keygen(bits, &out_dir),
        Command::Vote {
            index,
            candidates,
            public_key,
        } => {
            let public_key = load_public_key(public_key.as_deref())?;
            let ballot = encode_vote(index, candidates, &public_key, &mut OsRng)?;

            println!("{}", serde_json::to_string(&ballot)?);

            Ok(())
        }
        Command::Aggregate {
            ballots,
            public_key,
        } => {
            let public_key = load_public_key(public_key.as_deref())?;
            let aggregates = aggregate(&public_key, &ballots)?;

            println!("{}", serde_json::to_string(&aggregates)?);

            Ok(())
        }
        Command::Tally {
            aggregates,
            names,
            voter_bound,
            public_key,
            private_key,
        } => tally(
            &aggregates,
            names,
            voter_bound,
            public_key.as_deref(),
            private_key.as_deref(),
        ),
    }
}

fn keygen(bits: usize, out_dir: &Path) -> Result<()> {
    let (public_key, private_key) = KeyPair::generate(bits, &mut OsRng)?.into_parts();

    let public_path = out_dir.join(".env.public");
    write_file(&public_path, public_key.to_env_fragment().render().as_bytes(), false)?;

    let private_path = out_dir.join(".env.private");
    write_file(&private_path, private_key.to_env_fragment().render().as_bytes(), true)?;

    tracing::info!(
        bits,
        public = %public_path.display(),
        private = %private_path.display(),
        "generated Paillier key pair"
    );

    Ok(())
}

fn aggregate(public_key: &PublicKey, paths: &[PathBuf]) -> Result<Vec<Ciphertext>> {
    let ballots = paths
        .iter()
        .map(|path| read_json(path))
        .collect::<Result<Vec<EncryptedBallot>>>()?;

    let aggregates = aggregate_ballots(public_key, &ballots)?;
    tracing::debug!(ballots = ballots.len(), "aggregated ballots");

    Ok(aggregates)
}

/// Multiplies `ballots` slot by slot, starting every slot from the neutral ciphertext so that each
/// ballot is range-checked by [`PublicKey::add`].
fn aggregate_ballots(
    public_key: &PublicKey,
    ballots: &[EncryptedBallot],
) -> paillier_tally::Result<Vec<Ciphertext>> {
    let slots = ballots.first().map_or(0, EncryptedBallot::len);
    let mut aggregates = vec![Ciphertext::neutral(); slots];

    for ballot in ballots {
        if ballot.len() != slots {
            return Err(paillier_tally::Error::CountMismatch {
                expected: slots,
                actual: ballot.len(),
            });
        }

        aggregates = aggregates
            .iter()
            .zip(ballot.ciphertexts())
            .map(|(aggregate, ciphertext)| public_key.add(aggregate, ciphertext))
            .collect::<paillier_tally::Result<_>>()?;
    }

    Ok(aggregates)
}

fn tally(
    aggregates_path: &Path,
    names: Vec<String>,
    voter_bound: Option<u64>,
    public_key: Option<&Path>,
    private_key: Option<&Path>,
) -> Result<()> {
    let public_key = load_public_key(public_key)?;
    let private_key = load_private_key(public_key, private_key)?;

    let wire: Vec<String> = read_json(aggregates_path)?;
    let aggregates = wire
        .iter()
        .map(|aggregate| Ciphertext::parse_aggregate(aggregate))
        .collect::<paillier_tally::Result<Vec<_>>>()?;

    let names = if names.is_empty() {
        (0..aggregates.len()).map(|i| format!("candidate {i}")).collect()
    } else {
        names
    };
    let candidates = CandidateSet::from_names(names)?;

    let reconciler = Reconciler::new(&private_key);
    let reconciler = match voter_bound {
        Some(voter_bound) => reconciler.voter_bound(voter_bound),
        None => reconciler,
    };
    let tally = reconciler.reconcile_ordered(&aggregates, &candidates)?;

    let lines: Vec<TallyLine> = tally
        .iter()
        .zip(candidates.iter())
        .map(|(result, candidate)| TallyLine {
            candidate_id: result.candidate_id,
            display_name: &candidate.display_name,
            votes: result.votes,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&lines)?);

    Ok(())
}

fn load_public_key(path: Option<&Path>) -> Result<PublicKey> {
    let fragment = match path {
        Some(path) => read_fragment(path)?,
        None => EnvFragment::from_process_env(&[
            PUBLIC_KEY_N,
            PUBLIC_KEY_G,
            "NEXT_PUBLIC_PUBLIC_KEY_N",
            "NEXT_PUBLIC_PUBLIC_KEY_G",
        ]),
    };

    Ok(PublicKey::from_env_fragment(&fragment)?)
}

fn load_private_key(public_key: PublicKey, path: Option<&Path>) -> Result<PrivateKey> {
    let fragment = match path {
        Some(path) => read_fragment(path)?,
        None => EnvFragment::from_process_env(&[PRIVATE_KEY_LAMBDA, PRIVATE_KEY_MU]),
    };

    Ok(PrivateKey::from_env_fragment(public_key, &fragment)?)
}

fn read_fragment(path: &Path) -> Result<EnvFragment> {
    let text = zeroize::Zeroizing::new(fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?);

    Ok(EnvFragment::parse(&text)?)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8], owner_only: bool) -> Result<()> {
    let io_error = |source: std::io::Error| CliError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    if owner_only {
        use std::os::unix::fs::OpenOptionsExt;

        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(io_error)?;

    // `mode` only applies on creation; an existing file keeps its permissions.
    #[cfg(unix)]
    if owner_only {
        use std::os::unix::fs::PermissionsExt;

        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(io_error)?;
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    file.write_all(contents).map_err(io_error)
}
