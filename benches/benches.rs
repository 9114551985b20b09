// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::collections::HashMap;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use paillier_tally::test_exports::{private_key, PLAINTEXT};
use paillier_tally::{encode_vote, CandidateId, CandidateSet, Ciphertext, KeyPair, Reconciler};
use rand_core::OsRng;

pub fn benchmark_encrypt(c: &mut Criterion) {
    let mut g = c.benchmark_group("encrypt()");
    let private_key = private_key();
    let public_key = private_key.public_key();

    g.bench_function("1024-bit modulus", |bench| {
        bench.iter(|| public_key.encrypt(&PLAINTEXT, &mut OsRng))
    });

    let ciphertext = public_key.encrypt(&PLAINTEXT, &mut OsRng).unwrap();
    g.bench_function("decrypt() with a 1024-bit modulus", |bench| {
        bench.iter(|| private_key.decrypt(&ciphertext))
    });

    g.finish();
}

pub fn benchmark_encode_vote(c: &mut Criterion) {
    let mut g = c.benchmark_group("encode_vote()");
    g.sample_size(10);

    let private_key = private_key();
    let public_key = private_key.public_key();

    for candidate_count in [2, 10, 100] {
        g.bench_function(format!("{candidate_count} candidates"), |bench| {
            bench.iter(|| encode_vote(candidate_count / 2, candidate_count, public_key, &mut OsRng))
        });
    }

    g.finish();
}

pub fn benchmark_reconcile(c: &mut Criterion) {
    let mut g = c.benchmark_group("Reconciler::reconcile()");
    g.sample_size(10);

    let private_key = private_key();
    let public_key = private_key.public_key();

    for (candidate_count, number_of_ballots) in [(2u32, 100u64), (10, 1000), (100, 1000)] {
        let candidates =
            CandidateSet::from_names((0..candidate_count).map(|i| format!("candidate {i}")))
                .unwrap();

        let aggregates: HashMap<CandidateId, Option<Ciphertext>> = candidates
            .ids()
            .map(|candidate_id| {
                let votes = number_of_ballots / u64::from(candidate_count);

                (
                    candidate_id,
                    Some(public_key.encrypt_u64(votes, &mut OsRng).unwrap()),
                )
            })
            .collect();

        let reconciler = Reconciler::new(&private_key).voter_bound(number_of_ballots);

        g.bench_function(
            format!("{candidate_count} candidates and {number_of_ballots} ballots"),
            |bench| {
                bench.iter_batched(
                    || aggregates.clone(),
                    |aggregates| reconciler.reconcile(&aggregates, &candidates),
                    BatchSize::SmallInput,
                )
            },
        );
    }

    g.finish();
}

pub fn benchmark_key_generation(c: &mut Criterion) {
    let mut g = c.benchmark_group("KeyPair::generate()");
    g.sample_size(10);

    for bits in [512, 1024] {
        g.bench_function(format!("{bits} bits"), |bench| {
            bench.iter(|| KeyPair::generate(bits, &mut OsRng))
        });
    }

    g.finish();
}

criterion_group! {
  name = benches;
  config = Criterion::default().measurement_time(Duration::from_secs(10));
  targets = benchmark_encrypt, benchmark_encode_vote, benchmark_reconcile, benchmark_key_generation
}

criterion_main!(benches);
