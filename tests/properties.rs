//! Property tests over randomly generated queue/function hosts.
//!
//! Each host is a set of queues, each triggering one of up to two functions,
//! optionally padded with queues that trigger nothing and with a chain of
//! Target nodes no rule ever touches.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use triple_graph::{
    Domain, Engine, Graph, GraphBuilder, Node, NodeAllocator, Rule, RuleBuilder, TranslationPolicy,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

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

fn rules() -> Vec<Rule> {
    vec![
        Rule::axiom("queue", "Queue", "CfnQueue", "QueueAxiom").unwrap(),
        Rule::axiom("function", "Function", "CfnFunction", "FunctionAxiom").unwrap(),
        link_rule(),
    ]
}

/// `triggers[i]` is the function index queue `i` triggers.
fn build_host(ids: &mut NodeAllocator, triggers: &[usize], lonely: usize, strays: usize) -> Graph {
    let used: BTreeSet<usize> = triggers.iter().copied().collect();
    let functions: BTreeMap<usize, Node> = used
        .into_iter()
        .map(|i| (i, ids.node("Function", Domain::Source)))
        .collect();

    let mut builder = GraphBuilder::new();
    for &target in triggers {
        let queue = ids.node("Queue", Domain::Source);
        builder = builder.typed_edge(&queue, &functions[&target], "Triggers");
    }
    for _ in 0..lonely {
        builder = builder.node(&ids.node("Queue", Domain::Source));
    }

    let chain: Vec<Node> = (0..strays).map(|_| ids.node("CfnTopic", Domain::Target)).collect();
    for node in &chain {
        builder = builder.node(node);
    }
    for pair in chain.windows(2) {
        builder = builder.edge(&pair[0], &pair[1]);
    }
    builder.build().unwrap()
}

fn triggers_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..2usize, 1..=6)
}

// ─────────────────────────────────────────────────────────────────────────────
// PROPERTIES
// ─────────────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_matches_pair_equal_labels(triggers in triggers_strategy(), lonely in 0..2usize) {
        let mut ids = NodeAllocator::new();
        let mut host = build_host(&mut ids, &triggers, lonely, 0);

        // Axioms only, so the link rule still has open matches afterwards
        let axioms: Vec<Rule> = rules().into_iter().take(2).collect();
        Engine::with_policy(axioms, TranslationPolicy::unpruned())
            .translate_forward(&mut host, &mut ids)
            .unwrap();

        let rule = link_rule();
        let found = host.find_match(rule.graph(), Domain::Source);
        prop_assert_eq!(found.len(), 6);
        for (rule_node, host_node) in found.iter() {
            let expected = rule.graph().get(rule_node).unwrap();
            let actual = host.get(host_node).unwrap();
            prop_assert_eq!(&expected.node_type, &actual.node_type);
            prop_assert_eq!(expected.domain, actual.domain);
        }
    }

    #[test]
    fn prop_fixed_point_finds_no_match(triggers in triggers_strategy(), lonely in 0..2usize) {
        let mut ids = NodeAllocator::new();
        let mut host = build_host(&mut ids, &triggers, lonely, 0);
        let engine = Engine::new(rules());
        engine.translate_forward(&mut host, &mut ids).unwrap();

        for rule in engine.rules() {
            prop_assert!(host.find_match(rule.graph(), Domain::Source).is_empty());
        }
    }

    #[test]
    fn prop_one_correspondence_per_reading(triggers in triggers_strategy(), lonely in 0..2usize) {
        let mut ids = NodeAllocator::new();
        let mut host = build_host(&mut ids, &triggers, lonely, 0);
        let engine = Engine::new(rules());
        let translation = engine.translate_forward(&mut host, &mut ids).unwrap();

        let queues = triggers.len() + lonely;
        prop_assert_eq!(translation.firings.get("queue").copied(), Some(queues));
        prop_assert_eq!(translation.firings.get("link").copied(), Some(triggers.len()));

        let mut seen: BTreeSet<(String, Vec<u64>)> = BTreeSet::new();
        for link in host.nodes_in(Domain::Correspondence) {
            let mut sources: Vec<u64> = host
                .successors(link.id)
                .unwrap()
                .into_iter()
                .filter(|n| n.domain == Domain::Source)
                .map(|n| n.id.as_u64())
                .collect();
            sources.sort();
            prop_assert!(seen.insert((link.node_type.clone(), sources)));
        }
    }

    #[test]
    fn prop_renumbering_preserves_structure(triggers in triggers_strategy(), offset in 1u64..10_000) {
        let engine = Engine::new(rules());

        let mut ids_a = NodeAllocator::new();
        let mut host_a = build_host(&mut ids_a, &triggers, 0, 0);
        let a = engine.translate_forward(&mut host_a, &mut ids_a).unwrap();

        let mut ids_b = NodeAllocator::starting_at(offset);
        let mut host_b = build_host(&mut ids_b, &triggers, 0, 0);
        let b = engine.translate_forward(&mut host_b, &mut ids_b).unwrap();

        prop_assert_eq!(a.passes, b.passes);
        prop_assert_eq!(a.graph.structure_hash(), b.graph.structure_hash());
        prop_assert!(a.graph.is_isomorphic_to(&b.graph));
    }

    #[test]
    fn prop_prune_drops_unlinked_nodes(
        triggers in triggers_strategy(),
        lonely in 0..2usize,
        strays in 1..4usize,
    ) {
        let mut ids = NodeAllocator::new();
        let mut host = build_host(&mut ids, &triggers, lonely, strays);
        let engine = Engine::new(rules());
        let output = engine.translate_forward(&mut host, &mut ids).unwrap().into_graph();

        prop_assert!(output.nodes().iter().all(|n| n.node_type != "CfnTopic"));
        prop_assert!(output.nodes_in(Domain::Source).next().is_none());
        // Every queue, triggering or not, keeps its Target counterpart
        let queues = output.nodes().iter().filter(|n| n.node_type == "CfnQueue").count();
        prop_assert_eq!(queues, triggers.len() + lonely);
    }

    #[test]
    fn prop_round_trip_restores_source(triggers in triggers_strategy()) {
        let mut ids = NodeAllocator::new();
        let original = build_host(&mut ids, &triggers, 0, 0);
        let engine = Engine::new(rules());

        let mut host = original.clone();
        let forward = engine.translate_forward(&mut host, &mut ids).unwrap();
        let mut host = forward.into_graph();
        let backward = engine.translate_backward(&mut host, &mut ids).unwrap();

        let restored = backward.graph.project(Domain::Source);
        prop_assert!(restored.is_isomorphic_to(&original.project(Domain::Source)));
    }
}
