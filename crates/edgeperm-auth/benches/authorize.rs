//! Benchmark: evaluator hot path
//!
//! Every management API request runs one `authorize` call before the
//! handler. The evaluator is expected to stay far below request overhead:
//! one guard pass, one matrix index, and at most two set lookups.
//!
//! # When to revisit
//!
//! - If guard rules grow beyond a handful
//! - If callers start carrying hundreds of tokens

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use edgeperm_auth::{
    AccessRequest, AuthorizationPolicy, CallerGrants, Evaluator, IdentityChanges,
    IdentitySnapshot, PermissionRegistry,
};
use edgeperm_types::EntityType;

fn bench_authorize(c: &mut Criterion) {
    let evaluator = Evaluator::new();
    let mut group = c.benchmark_group("authorize");

    let admin = CallerGrants::admin();
    let read = AccessRequest::read(EntityType::Service);
    group.bench_function("admin/short_circuit", |b| {
        b.iter(|| black_box(evaluator.authorize(&admin, &read)));
    });

    let scoped = CallerGrants::from_tokens(["service.read", "config", "ops.delete"]);
    group.bench_function("action_token/allow", |b| {
        b.iter(|| black_box(evaluator.authorize(&scoped, &read)));
    });

    let listing = AccessRequest::list_related(EntityType::Service, "configs");
    group.bench_function("listing/allow", |b| {
        b.iter(|| black_box(evaluator.authorize(&scoped, &listing)));
    });

    let patch = AccessRequest::patch(EntityType::Identity)
        .with_target(IdentitySnapshot::new("id"))
        .with_changes(IdentityChanges::new().with_is_admin(true));
    let manager = CallerGrants::from_tokens(["identity"]);
    group.bench_function("guard/deny", |b| {
        b.iter(|| black_box(evaluator.authorize(&manager, &patch)));
    });

    // === Token count scaling ===

    let vocabulary: Vec<&str> = PermissionRegistry::global()
        .tokens()
        .filter(|t| !t.starts_with("admin") && !t.starts_with("service"))
        .collect();
    for count in [1usize, 16, 64] {
        let grants = CallerGrants::from_tokens(vocabulary.iter().take(count));
        group.bench_with_input(BenchmarkId::new("deny_after_lookup", count), &grants, |b, g| {
            b.iter(|| black_box(evaluator.authorize(g, &read)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_authorize);
criterion_main!(benches);
