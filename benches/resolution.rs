use criterion::{black_box, criterion_group, criterion_main, Criterion};
use locus_di::{Resolver, Scope};
use std::sync::Arc;

struct Config {
    port: u16,
}

struct Service {
    config: Arc<Config>,
}

fn bench_resolution(c: &mut Criterion) {
    let scope = Scope::new();
    scope.register_singleton::<Config, _>(|_| Ok(Config { port: 8080 }));
    scope.register_factory::<Service, _>(|ctx| {
        Ok(Service {
            config: ctx.get::<Config>()?,
        })
    });

    // Materialize the singleton so the cached path is what gets measured.
    let _ = scope.get::<Config>().unwrap();

    c.bench_function("singleton_cached", |b| {
        b.iter(|| black_box(scope.get::<Config>().unwrap()))
    });

    c.bench_function("transient_with_dependency", |b| {
        b.iter(|| black_box(scope.get::<Service>().unwrap()))
    });

    let child = scope.create_child();
    c.bench_function("parent_fallback", |b| {
        b.iter(|| black_box(child.get::<Config>().unwrap()))
    });

    let grandchild = child.create_child();
    c.bench_function("two_level_fallback", |b| {
        b.iter(|| black_box(grandchild.get::<Config>().unwrap()))
    });
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
