//! Performance benchmarks for matching and translation.
//!
//! Run with: `cargo bench --bench translation`
//!
//! Hosts are `n` queues all triggering one function, so the link rule has `n`
//! distinct matches and every pass re-enumerates the same growing host.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use triple_graph::{
    Domain, Engine, Graph, GraphBuilder, NodeAllocator, Rule, RuleBuilder, TranslationPolicy,
};

fn link_rule() -> Rule {
    let mut rule = RuleBuilder::new("link");
    let q_s = rule.preserve("Queue", Domain::Source);
    let f_s = rule.preserve("Function", Domain::Source);
    let q_t = rule.preserve("CfnQueue", Domain::Target);
    let f_t = rule.preserve("CfnFunction", Domain::Target);
    let q_c = rule.preserve_default_correspondence("QueueAxiom");
    let f_c = rule.preserve_default_correspondence("FunctionAxiom");
    let link = rule.create("TriggersLink", Domain::Correspondence);

    rule.preserve_edge(q_c, q_s)
        .preserve_edge(q_c, q_t)
        .preserve_edge(f_c, f_s)
        .preserve_edge(f_c, f_t)
        .create_typed_edge(q_s, f_s, "Triggers")
        .create_typed_edge(q_t, f_t, "Triggers");
    for node in [q_s, f_s, q_t, f_t] {
        rule.create_edge(link, node);
    }
    rule.build().unwrap()
}

fn axioms() -> Vec<Rule> {
    vec![
        Rule::axiom("queue", "Queue", "CfnQueue", "QueueAxiom").unwrap(),
        Rule::axiom("function", "Function", "CfnFunction", "FunctionAxiom").unwrap(),
    ]
}

/// `queues` queues triggering one function.
fn fan_in_host(ids: &mut NodeAllocator, queues: usize) -> Graph {
    let function = ids.node("Function", Domain::Source);
    let mut builder = GraphBuilder::new().node(&function);
    for _ in 0..queues {
        let queue = ids.node("Queue", Domain::Source);
        builder = builder.typed_edge(&queue, &function, "Triggers");
    }
    builder.build().unwrap()
}

/// Benchmark a single link-rule match on a host with axioms applied.
fn bench_find_match(c: &mut Criterion) {
    let rule = link_rule();
    let mut group = c.benchmark_group("find_match");

    for queues in [1, 2, 4, 8] {
        let mut ids = NodeAllocator::new();
        let mut host = fan_in_host(&mut ids, queues);
        Engine::with_policy(axioms(), TranslationPolicy::unpruned())
            .translate_forward(&mut host, &mut ids)
            .unwrap();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("queues", queues), &host, |b, host| {
            b.iter(|| {
                let found = host.find_match(black_box(rule.graph()), Domain::Source);
                assert!(!found.is_empty());
                found
            })
        });
    }

    group.finish();
}

/// Benchmark a full forward translation, pruning included.
fn bench_translate_forward(c: &mut Criterion) {
    let mut rules = axioms();
    rules.push(link_rule());
    let engine = Engine::new(rules);

    let mut group = c.benchmark_group("translate_forward");

    for queues in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements(queues as u64));
        group.bench_with_input(BenchmarkId::new("queues", queues), &queues, |b, &queues| {
            b.iter(|| {
                let mut ids = NodeAllocator::new();
                let mut host = fan_in_host(&mut ids, queues);
                let translation = engine
                    .translate_forward(black_box(&mut host), &mut ids)
                    .unwrap();
                assert_eq!(translation.total_firings(), 2 * queues + 1);
                translation
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_match, bench_translate_forward);
criterion_main!(benches);
