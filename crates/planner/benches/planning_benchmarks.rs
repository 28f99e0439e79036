use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use surgeplan_ai::fallback_briefing;
use surgeplan_core::{DetectedEvent, InventoryBaseline, Location};
use surgeplan_planner::{apply_multipliers, compose_plan, extract_features, parse_inventory_context};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()
}

fn inventory_csv(rows: usize) -> String {
    let mut out = String::from("category,quantity\noccupancy,91%\n");
    for i in 0..rows {
        out.push_str(&format!("item {i} masks,{}\n", 100 + i));
    }
    out
}

fn bench_context_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_context_parsing");

    for rows in [10usize, 100, 1_000].iter() {
        let csv = inventory_csv(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("delimited", rows), &csv, |b, csv| {
            b.iter(|| black_box(parse_inventory_context(black_box(csv))));
        });
    }

    group.finish();
}

fn bench_plan_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_construction");
    let location = Location::parse("Chicago, IL").unwrap();

    for rows in [10usize, 100, 1_000].iter() {
        let csv = inventory_csv(*rows);
        let context = parse_inventory_context(&csv);
        let names: Vec<String> = context.quantities.keys().cloned().collect();
        let events: Vec<DetectedEvent> = (0..5)
            .map(|i| {
                DetectedEvent::new(format!("event {i}"), 0.9)
                    .with_effect(&names[i % names.len()], 1.2)
            })
            .collect();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("features_and_compose", rows), &csv, |b, csv| {
            b.iter(|| {
                let features = extract_features(&location, csv, as_of());
                let plan = compose_plan(names.iter().map(String::as_str), &features, &events, 2.0);
                black_box(plan)
            });
        });
    }

    group.finish();
}

fn bench_apply_and_briefing(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_and_briefing");
    let location = Location::parse("Chicago, IL").unwrap();

    let csv = inventory_csv(200);
    let context = parse_inventory_context(&csv);
    let baselines: InventoryBaseline = context.baseline().unwrap();
    let features = extract_features(&location, &csv, as_of());
    let (plan, _) = compose_plan(baselines.categories(), &features, &[], 2.0).unwrap();

    group.bench_function("apply_multipliers_200", |b| {
        b.iter(|| black_box(apply_multipliers(black_box(&plan), black_box(&baselines))));
    });

    let translated = apply_multipliers(&plan, &baselines);
    group.bench_function("fallback_briefing_200", |b| {
        b.iter(|| black_box(fallback_briefing(&plan, &features, &[], &translated)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_context_parsing,
    bench_plan_construction,
    bench_apply_and_briefing
);
criterion_main!(benches);
