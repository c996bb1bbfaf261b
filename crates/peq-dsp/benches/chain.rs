//! Full EQ benchmarks

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use peq_core::{AtomicParameterStore, CutSectionPolicy, EqConfig, ParamId};
use peq_dsp::chain::ChannelChain;
use peq_dsp::{MonoProcessor, ParametricEq};

const BLOCK: usize = 512;

fn busy_store() -> Arc<AtomicParameterStore> {
    let store = Arc::new(AtomicParameterStore::new());
    store.set_param(ParamId::LowCutFreq, 80.0);
    store.set_param(ParamId::LowCutSlope, 3.0);
    store.set_param(ParamId::HiCutFreq, 12000.0);
    store.set_param(ParamId::HiCutSlope, 3.0);
    store.set_param(ParamId::Peak1Gain, 4.5);
    store.set_param(ParamId::Peak2Gain, -6.0);
    store.set_param(ParamId::Peak3Gain, 3.0);
    store
}

fn bench_process_block(c: &mut Criterion) {
    let mut eq = ParametricEq::new(busy_store(), EqConfig::default());
    eq.prepare(48000.0, BLOCK).unwrap();

    let mut left: Vec<f64> = (0..BLOCK).map(|i| (i as f64 * 0.01).sin()).collect();
    let mut right = left.clone();

    c.bench_function("eq_stereo_block_512", |b| {
        b.iter(|| {
            let mut buffer: [&mut [f64]; 2] = [&mut left, &mut right];
            eq.process_block(black_box(&mut buffer), BLOCK);
        })
    });
}

fn bench_process_block_distinct(c: &mut Criterion) {
    let config = EqConfig::default().with_cut_sections(CutSectionPolicy::Distinct);
    let mut eq = ParametricEq::new(busy_store(), config);
    eq.prepare(48000.0, BLOCK).unwrap();

    let mut left: Vec<f64> = (0..BLOCK).map(|i| (i as f64 * 0.01).sin()).collect();
    let mut right = left.clone();

    c.bench_function("eq_stereo_block_512_distinct", |b| {
        b.iter(|| {
            let mut buffer: [&mut [f64]; 2] = [&mut left, &mut right];
            eq.process_block(black_box(&mut buffer), BLOCK);
        })
    });
}

fn bench_update_filters(c: &mut Criterion) {
    let mut eq = ParametricEq::new(busy_store(), EqConfig::default());
    eq.prepare(48000.0, BLOCK).unwrap();

    c.bench_function("eq_update_filters", |b| {
        b.iter(|| {
            eq.update_filters();
            black_box(eq.chains());
        })
    });
}

fn bench_channel_chain(c: &mut Criterion) {
    let mut chain = ChannelChain::new();
    let mut buffer: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.01).sin()).collect();

    c.bench_function("channel_chain_mono_1024", |b| {
        b.iter(|| {
            chain.process_block(black_box(&mut buffer));
        })
    });
}

criterion_group!(
    benches,
    bench_process_block,
    bench_process_block_distinct,
    bench_update_filters,
    bench_channel_chain
);
criterion_main!(benches);
