//! Scenario benchmarks: whole frames of realistic bus traffic.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rusty_bench::fixtures::{event_type, payload, populated_bus};
use rusty_bench::memory::{BusFootprint, measure_memory};
use rusty_bench::scenarios::{Scenario, UiConfig, UiScenario};

#[cfg(feature = "memory_profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

// =============================================================================
// UI Benchmarks
// =============================================================================

fn bench_ui(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/ui");

    let configs = [
        ("small", UiConfig { widget_count: 100, ..Default::default() }),
        ("medium", UiConfig { widget_count: 1_000, ..Default::default() }),
        ("large", UiConfig { widget_count: 10_000, ..Default::default() }),
    ];

    for (name, config) in configs {
        group.throughput(Throughput::Elements(config.events_per_frame as u64));

        // Full frame update
        group.bench_with_input(BenchmarkId::new("frame", name), &config, |b, config| {
            let mut scenario = UiScenario::with_config(config.clone());
            scenario.setup();

            b.iter(|| {
                scenario.update();
            });

            scenario.teardown();
        });
    }

    group.finish();
}

/// Reports heap use once per size; no timing.
fn report_memory(_c: &mut Criterion) {
    for widget_count in [100, 1_000] {
        let (scenario, stats) = measure_memory(|| {
            let mut scenario = UiScenario::with_config(UiConfig { widget_count, ..Default::default() });
            scenario.setup();
            scenario
        });
        let listeners = scenario.listener_count();
        println!(
            "{} setup ({widget_count} widgets, {listeners} listeners): {stats}, {:.1} B/listener",
            scenario.name(),
            stats.bytes_per(listeners)
        );
    }

    for per_type in [100, 1_000] {
        let measured = BusFootprint::measure(|| populated_bus(4, per_type), &event_type(0), &payload(), 100);
        match measured {
            Ok((_, footprint)) => println!("fan-out {per_type}: {footprint}"),
            Err(err) => eprintln!("fan-out {per_type}: {err}"),
        }
    }
}

criterion_group!(benches, bench_ui, report_memory);
criterion_main!(benches);
