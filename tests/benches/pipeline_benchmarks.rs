//! # Email-Proof Pipeline Benchmarks
//!
//! | Stage | Input |
//! |-------|-------|
//! | Body canonicalization | 1 KiB to 1 MiB bodies, simple and relaxed |
//! | Limb encoding | 256-bit hashes and 2048-bit moduli |
//! | Full verification | signed 2048-bit RSA message, static key |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ep_01_dkim_verification::{
    canonicalize_body, Canonicalization, CanonicalizationPair, DkimVerificationService,
    EmailVerificationApi, KeyResolver, StaticKeyQuery, VerifierConfig, DNS_TXT_METHOD,
};
use ep_02_circuit_inputs::value_to_limbs;
use ep_tests::fixtures::{SignOptions, TestSigner, DOMAIN, HEADERS, SELECTOR};
use rand::Rng;
use std::time::Duration;

/// Body of roughly `size` bytes with mixed whitespace and blank runs.
fn sample_body(size: usize) -> Vec<u8> {
    let line: &[u8] = b"Quarterly  numbers\tare attached   \r\n\r\n";
    line.iter().copied().cycle().take(size).collect()
}

// ============================================================================
// BODY CANONICALIZATION
// ============================================================================

fn bench_body_canonicalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("body-canonicalization");

    for size in [1 << 10, 64 << 10, 1 << 20] {
        let body = sample_body(size);
        group.throughput(Throughput::Bytes(size as u64));

        for algorithm in [Canonicalization::Simple, Canonicalization::Relaxed] {
            group.bench_with_input(BenchmarkId::new(algorithm.as_str(), size), &body, |b, body| {
                b.iter(|| black_box(canonicalize_body(algorithm, body)))
            });
        }
    }

    group.finish();
}

// ============================================================================
// LIMB ENCODING
// ============================================================================

fn bench_limb_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("limb-encoding");
    let mut rng = rand::thread_rng();

    let mut hash = [0u8; 32];
    rng.fill(&mut hash);
    group.bench_function("hash_4x64", |b| {
        b.iter(|| black_box(value_to_limbs(64, 4, black_box(&hash))))
    });

    let mut modulus = [0u8; 256];
    rng.fill(&mut modulus[..]);
    group.bench_function("modulus_32x64", |b| {
        b.iter(|| black_box(value_to_limbs(64, 32, black_box(&modulus))))
    });
    group.bench_function("modulus_121x17", |b| {
        b.iter(|| black_box(value_to_limbs(17, 121, black_box(&modulus))))
    });

    group.finish();
}

// ============================================================================
// FULL VERIFICATION
// ============================================================================

fn bench_full_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("full-verification");
    group.measurement_time(Duration::from_secs(10));

    let signer = TestSigner::generate(2048).expect("key generation failed");
    let record = signer.key_record().expect("key encoding failed");
    let resolver = KeyResolver::new().with_method(
        DNS_TXT_METHOD,
        StaticKeyQuery::new().with_record(DOMAIN, SELECTOR, record),
    );
    let service = DkimVerificationService::new(VerifierConfig::default(), resolver)
        .expect("invalid config");

    let options = SignOptions {
        canonicalization: CanonicalizationPair {
            header: Canonicalization::Relaxed,
            body: Canonicalization::Relaxed,
        },
        ..SignOptions::default()
    };

    for size in [1 << 10, 64 << 10] {
        let message = signer
            .sign(HEADERS, &sample_body(size), &options)
            .expect("signing failed");
        group.throughput(Throughput::Bytes(message.len() as u64));
        group.bench_with_input(BenchmarkId::new("verify", size), &message, |b, message| {
            b.iter(|| black_box(service.verify(message).is_ok()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_body_canonicalization,
    bench_limb_encoding,
    bench_full_verification,
);

criterion_main!(benches);
