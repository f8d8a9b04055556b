//! Benchmarks for quorum resolution and the store-wide tally.
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quorum_core::events::{ContainerEvent, ContainerState, EventStore, InMemoryEventStore};
use quorum_core::quorum::{resolve_events, tally_states};

fn history(len: usize) -> Vec<ContainerEvent> {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let state = ContainerState::ALL[i % ContainerState::ALL.len()];
            ContainerEvent::new("bench-container", state, base + chrono::Duration::seconds(i as i64))
        })
        .collect()
}

fn bench_resolve_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_events");
    for len in [3, 30, 300, 3_000] {
        let events = history(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &events, |b, events| {
            b.iter(|| black_box(resolve_events(black_box(events))));
        });
    }
    group.finish();
}

fn bench_tally_states(c: &mut Criterion) {
    let events = history(1_000);
    c.bench_function("tally_states_1000", |b| {
        b.iter(|| black_box(tally_states(black_box(&events))));
    });
}

fn bench_inmemory_tally_across_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_tally_across_all");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

    for containers in [10, 100, 1_000] {
        let store = InMemoryEventStore::new();
        rt.block_on(async {
            for i in 0..containers * 4 {
                let event = ContainerEvent::new(
                    format!("c{}", i % containers),
                    ContainerState::Operational,
                    base,
                );
                store.append(event).await.unwrap();
            }
        });

        group.bench_with_input(BenchmarkId::from_parameter(containers), &store, |b, store| {
            b.iter(|| rt.block_on(async { black_box(store.tally_across_all().await.unwrap()) }));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_events,
    bench_tally_states,
    bench_inmemory_tally_across_all
);
criterion_main!(benches);
