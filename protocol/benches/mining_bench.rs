// Hashing and mining benchmarks.
//
// Compares the reference and accelerated providers on raw hashing, on the
// four-part preimage the mining loop actually feeds them, and on full block
// mining at a few difficulties. Also times whole-chain validation.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use hashchain::chain::Preimage;
use hashchain::{Block, Candidate, Chain, HashProvider, ProviderId, ProviderSet};

const TS: &str = "1700000000000";
const PROVIDERS: [ProviderId; 2] = [ProviderId::Reference, ProviderId::Accelerated];

fn providers() -> ProviderSet {
    ProviderSet::loaded().unwrap()
}

/// Builds a chain of `n` mined blocks on top of genesis.
fn setup_chain(n: usize, difficulty: usize) -> Chain {
    let providers = Arc::new(providers());
    let genesis = Block::genesis(TS, None, ProviderId::Accelerated, &providers).unwrap();
    let mut chain = Chain::new(genesis, Arc::clone(&providers)).unwrap();
    for i in 0..n {
        let payload = json!({ "from": "John", "to": "Bob", "amount": i });
        chain
            .append(Candidate::new(TS, Some(payload), ProviderId::Accelerated), difficulty)
            .unwrap();
    }
    chain
}

fn bench_hash(c: &mut Criterion) {
    let set = providers();
    let mut group = c.benchmark_group("hash/single");

    for size in [64usize, 1024] {
        let input = "x".repeat(size);
        group.throughput(Throughput::Bytes(size as u64));
        for id in PROVIDERS {
            group.bench_with_input(BenchmarkId::new(id.as_str(), size), &input, |b, input| {
                b.iter(|| set.get(id).hash(input).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_preimage(c: &mut Criterion) {
    let set = providers();
    let payload = json!({ "from": "John", "to": "Bob", "amount": 100 });
    let previous = "0".repeat(64);
    let preimage = Preimage::new(&previous, TS, Some(&payload));
    let mut group = c.benchmark_group("hash/preimage");

    for id in PROVIDERS {
        group.bench_function(id.as_str(), |b| {
            let mut nonce = 0u64;
            b.iter(|| {
                nonce += 1;
                preimage.digest(nonce, set.get(id)).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_mine(c: &mut Criterion) {
    let set = providers();
    let mut group = c.benchmark_group("chain/mine");
    group.sample_size(10);

    for difficulty in [1usize, 2, 3] {
        for id in PROVIDERS {
            group.bench_with_input(
                BenchmarkId::new(id.as_str(), difficulty),
                &difficulty,
                |b, &d| {
                    b.iter_with_setup(
                        || {
                            let mut candidate = Candidate::new(TS, Some(json!(d)), id);
                            candidate.link_to("0".repeat(64));
                            candidate
                        },
                        |candidate| candidate.mine(d, &set).unwrap(),
                    );
                },
            );
        }
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain/validate");

    for length in [10usize, 100] {
        let chain = setup_chain(length, 1);
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &chain, |b, chain| {
            b.iter(|| assert!(chain.validate().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hash, bench_preimage, bench_mine, bench_validate);
criterion_main!(benches);
