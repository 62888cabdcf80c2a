use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rgc::assemble::{build_caustics_graph, default_graph_set};
use rgc::builder::GraphBuilder;
use rgc::catalog::{PassCatalog, PassConfig, PassDecl};
use rgc::passes::standard_catalog;
use rgc::variant::{FilterKind, FilterOrder, VariantSelection};

// Assembly latency scenarios.
// All scenarios build against the built-in catalog unless noted.

fn scenarios() -> [(&'static str, VariantSelection); 4] {
    [
        (
            "accum_post",
            VariantSelection::new(FilterKind::Accumulation, FilterOrder::Post, false),
        ),
        (
            "temporal_pre",
            VariantSelection::new(FilterKind::TemporalFilter, FilterOrder::Pre, false),
        ),
        (
            "denoiser_pre_debug",
            VariantSelection::new(FilterKind::DenoiserFilter, FilterOrder::Pre, true),
        ),
        (
            "temporal_post_debug",
            VariantSelection::new(FilterKind::TemporalFilter, FilterOrder::Post, true),
        ),
    ]
}

/// Builder for a linear chain of `n` passes with one marked output.
/// Every pass reads from all of its predecessors so edge count grows
/// quadratically.
fn dense_chain(catalog: &PassCatalog, n: usize) -> GraphBuilder {
    let mut b = GraphBuilder::new("dense");
    for i in 0..n {
        let pass = catalog
            .instantiate("Node", &format!("N{i}"), &PassConfig::new())
            .expect("benchmark pass must instantiate");
        b.add_pass(pass).expect("benchmark pass names are unique");
    }
    for dst in 1..n {
        for src in 0..dst {
            b.add_edge(&format!("N{src}.out"), &format!("N{dst}.in{src}"))
                .expect("benchmark edge must wire");
        }
    }
    b.mark_output(&format!("N{}.out", n - 1))
        .expect("benchmark output must mark");
    b
}

fn dense_catalog(n: usize) -> PassCatalog {
    let mut decl = PassDecl::new("Node").output("out");
    for i in 0..n {
        decl = decl.input(&format!("in{i}"));
    }
    PassCatalog::from_declarations([decl]).expect("benchmark catalog must build")
}

// Catalog construction from the built-in declarations.
fn bench_catalog(c: &mut Criterion) {
    c.bench_function("catalog/standard", |b| {
        b.iter(|| black_box(standard_catalog().expect("built-in catalog")));
    });
}

// Single-variant assembly (assemble -> validate -> freeze).
fn bench_variant_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble/variant");
    let catalog = standard_catalog().expect("built-in catalog");

    for (name, selection) in scenarios() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &selection, |b, &sel| {
            b.iter(|| {
                let g = build_caustics_graph(&catalog, black_box(sel)).expect("variant must build");
                black_box(g);
            });
        });
    }

    group.finish();
}

// Every selection plus the preset set, as the CLI would run them.
fn bench_all_variants(c: &mut Criterion) {
    let catalog = standard_catalog().expect("built-in catalog");

    c.bench_function("assemble/all_selections", |b| {
        b.iter(|| {
            for sel in VariantSelection::all() {
                black_box(build_caustics_graph(&catalog, sel).expect("variant must build"));
            }
        });
    });

    c.bench_function("assemble/default_set", |b| {
        b.iter(|| black_box(default_graph_set(&catalog).expect("preset must build")));
    });
}

// Validation only, on builders wired outside the timed region.
fn bench_validate_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate/dense_chain");

    for n in [4_usize, 16, 32, 64] {
        let catalog = dense_catalog(n);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n}passes")),
            &n,
            |b, &n| {
                b.iter_batched(
                    || dense_chain(&catalog, n),
                    |builder| black_box(builder.validate().expect("dense chain is acyclic")),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

// Emitters on a fully instrumented graph.
fn bench_emit(c: &mut Criterion) {
    let catalog = standard_catalog().expect("built-in catalog");
    let graph = build_caustics_graph(
        &catalog,
        VariantSelection::new(FilterKind::DenoiserFilter, FilterOrder::Post, true),
    )
    .expect("variant must build");

    let mut group = c.benchmark_group("emit");
    group.bench_function("dot", |b| {
        b.iter(|| black_box(rgc::dot::emit_dot(black_box(&graph))));
    });
    group.bench_function("fingerprint", |b| {
        b.iter(|| black_box(graph.fingerprint().expect("graph serializes")));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_catalog,
    bench_variant_build,
    bench_all_variants,
    bench_validate_scaling,
    bench_emit,
);
criterion_main!(benches);
