//! Criterion benchmarks for configuration resolution.
//!
//! Resolution runs on every attribute change, so it should stay well under a
//! frame budget even for URLs that already carry query parameters.
//!
//! Run with:
//! ```bash
//! cargo bench --package embed-core --bench resolve_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use embed_core::{resolve, EmbedContext, WidgetAttributes, WidgetConfiguration};

// ── Configuration fixtures ────────────────────────────────────────────────────

fn make_minimal() -> WidgetConfiguration {
    WidgetAttributes::new()
        .with("url", "https://calendly.com/acme/intro")
        .to_configuration()
}

fn make_all_options() -> WidgetConfiguration {
    WidgetAttributes::new()
        .with("url", "https://calendly.com/acme/intro")
        .with("height", "900")
        .with("hide-details", "true")
        .with("hide-gdpr", "true")
        .with("background-color", "1a1a1a")
        .with("text-color", "ffffff")
        .with("primary-color", "00a2ff")
        .to_configuration()
}

fn make_existing_query() -> WidgetConfiguration {
    WidgetAttributes::new()
        .with(
            "url",
            "https://calendly.com/acme/intro?month=2026-11&utm_source=site&embed_type=Popup#top",
        )
        .with("primary-color", "00a2ff")
        .to_configuration()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_resolve(c: &mut Criterion) {
    let context = EmbedContext::new("www.example.com");
    let configs = [
        ("minimal", make_minimal()),
        ("all_options", make_all_options()),
        ("existing_query", make_existing_query()),
    ];

    let mut group = c.benchmark_group("resolve");
    for (name, cfg) in &configs {
        group.bench_with_input(BenchmarkId::new("config", name), cfg, |b, cfg| {
            b.iter(|| resolve(black_box(cfg), black_box(&context)).expect("fixture must resolve"))
        });
    }
    group.finish();
}

fn bench_attribute_parsing(c: &mut Criterion) {
    let attrs = WidgetAttributes::new()
        .with("url", "https://calendly.com/acme/intro")
        .with("height", "900")
        .with("hide-details", "true")
        .with("primary-color", "00a2ff");

    c.bench_function("to_configuration", |b| {
        b.iter(|| black_box(&attrs).to_configuration())
    });
}

criterion_group!(benches, bench_resolve, bench_attribute_parsing);
criterion_main!(benches);
