/// Format pipeline benchmarks
///
/// Measures verb expansion, inspection and full line rendering into an
/// in-memory sink.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nsdebug::format::{expand_verbs, substitute};
use nsdebug::{
    args, DebugConfig, FormatterRegistry, MemorySink, PatternSet, Registry, RenderContext,
};
use serde_json::json;

const CTX: RenderContext = RenderContext {
    colors: false,
    depth: Some(2),
};

fn bench_expand_verbs(c: &mut Criterion) {
    let formatters = FormatterRegistry::new();

    c.bench_function("expand_verbs_mixed", |b| {
        b.iter(|| {
            let mut values = args![json!({ "id": 7, "tags": ["a", "b"] }), b"payload", "tail"];
            let out = expand_verbs(
                black_box("obj=%o buf=%8.2B rest=%s"),
                &mut values,
                &formatters,
                &CTX,
            );
            black_box(substitute(&out, values, &CTX))
        })
    });
}

fn bench_pattern_matching(c: &mut Criterion) {
    let patterns = PatternSet::compile("http:*,db:*,-http:noisy,-db:pool:*").unwrap();

    c.bench_function("pattern_is_enabled", |b| {
        b.iter(|| {
            for namespace in ["http:req", "http:noisy", "db:pool:conn", "worker"] {
                black_box(patterns.is_enabled(black_box(namespace)));
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_line");

    for colors in [false, true] {
        let sink = MemorySink::new().with_columns(120);
        let registry = Registry::builder(DebugConfig::default())
            .colors(colors)
            .sink(sink.clone())
            .build()
            .unwrap();
        registry.enable("bench:*").unwrap();
        let logger = registry.create("bench:render");

        group.bench_with_input(BenchmarkId::new("colors", colors), &colors, |b, _| {
            b.iter(|| {
                logger.info(
                    "request %s took %dms %O",
                    args![
                        "GET /",
                        12,
                        json!({ "status": 200, "headers": { "host": "localhost" } })
                    ],
                );
                sink.clear();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_expand_verbs, bench_pattern_matching, bench_render);
criterion_main!(benches);
