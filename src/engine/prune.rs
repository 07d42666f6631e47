//! Post-translation pruning.
//!
//! Keeps the part of a host graph that belongs to a confirmed
//! correspondence when seen from one domain.
//!
//! ## Algorithm
//!
//! 1. Every default correspondence pairs its one source node with its one
//!    target node. Every other correspondence node covers, and keeps, its
//!    successors in the pruned domain.
//! 2. A node is untouched when it has a default partner and neither it nor
//!    the partner is covered.
//! 3. From every untouched node of the domain, keep everything reachable over
//!    outgoing edges, then everything reachable over incoming edges. Both
//!    sweeps stop at covered nodes.
//! 4. The result holds every kept node and every host edge between two kept
//!    nodes.
//!
//! Disconnected fragments are not reattached.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::EngineError;
use crate::graph::Graph;
use crate::types::{Domain, NodeId};

/// Prune `host` as seen from `domain`.
pub fn prune(host: &Graph, domain: Domain) -> Result<Graph, EngineError> {
    let mut partners: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut covered: BTreeSet<NodeId> = BTreeSet::new();

    for link in host.nodes_in(Domain::Correspondence) {
        let successors = host.successors(link.id)?;
        if link.is_default {
            let sources: Vec<NodeId> = successors
                .iter()
                .filter(|n| n.domain == Domain::Source)
                .map(|n| n.id)
                .collect();
            let targets: Vec<NodeId> = successors
                .iter()
                .filter(|n| n.domain == Domain::Target)
                .map(|n| n.id)
                .collect();

            match (sources.as_slice(), targets.as_slice()) {
                ([source], [target]) => {
                    partners.insert(*source, *target);
                    partners.insert(*target, *source);
                }
                _ => {
                    return Err(EngineError::DefaultCorrespondenceArity {
                        node: link.id,
                        sources: sources.len(),
                        targets: targets.len(),
                    })
                }
            }
        } else {
            covered.extend(successors.iter().filter(|n| n.domain == domain).map(|n| n.id));
        }
    }

    let untouched = |id: &NodeId| {
        !covered.contains(id)
            && partners
                .get(id)
                .is_some_and(|partner| !covered.contains(partner))
    };
    let seeds: Vec<NodeId> = host
        .nodes_in(domain)
        .map(|n| n.id)
        .filter(|id| untouched(id))
        .collect();

    let mut kept = covered.clone();
    kept.extend(sweep(host, &seeds, &covered)?);
    kept.extend(sweep(&host.reverse(), &seeds, &covered)?);

    trace!(
        domain = %domain,
        covered = covered.len(),
        seeds = seeds.len(),
        kept = kept.len(),
        "Pruned host graph"
    );

    let nodes = host
        .nodes()
        .iter()
        .filter(|n| kept.contains(&n.id))
        .cloned()
        .collect();
    let edges = host
        .edges()
        .iter()
        .filter(|e| kept.contains(&e.from) && kept.contains(&e.to))
        .cloned()
        .collect();

    let graph = Graph::from_parts(nodes, edges)?;
    Ok(match host.name() {
        Some(name) => graph.with_name(name),
        None => graph,
    })
}

/// Everything reachable from `seeds` over outgoing edges.
///
/// Nodes in `stop` are neither entered nor expanded.
fn sweep(
    graph: &Graph,
    seeds: &[NodeId],
    stop: &BTreeSet<NodeId>,
) -> Result<BTreeSet<NodeId>, EngineError> {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut stack: Vec<NodeId> = seeds.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if stop.contains(&id) || !visited.insert(id) {
            continue;
        }
        for next in graph.successors(id)?.into_iter().rev() {
            if !visited.contains(&next.id) {
                stack.push(next.id);
            }
        }
    }
    Ok(visited)
}
