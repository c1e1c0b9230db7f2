//! Benchmarks decoding the golden fixtures, from hex string to JSON.
//!
//! `angstrom_bundle` is a real bundle with two assets and a top-of-block
//! order, `order_bundle` is a synthetic word-layout bundle with one order.

use bundle_decoder::{DecodeOptions, Layout};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for (layout, path) in [
        (Layout::Words, "tests/data/words/order_bundle.hex"),
        (Layout::Packed, "tests/data/packed/angstrom_bundle.hex"),
    ] {
        let hex = std::fs::read_to_string(path).unwrap();
        let hex = hex.trim();
        let options = DecodeOptions {
            layout,
            ..Default::default()
        };
        group.bench_function(format!("{layout} to typed bundle"), |b| {
            b.iter(|| bundle_decoder::decode_with(black_box(hex), &options).unwrap())
        });
        group.bench_function(format!("{layout} to json"), |b| {
            b.iter(|| {
                let bundle = bundle_decoder::decode_with(black_box(hex), &options).unwrap();
                bundle_decoder::to_json(&bundle).unwrap()
            })
        });
    }

    group.finish()
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = criterion_benchmark);
criterion_main!(benches);
