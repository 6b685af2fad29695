use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::debug;

use crate::error::{Result, TopologyError};
use crate::network::Topology;
use crate::{NodeId, Weight};

/// Result of a single-source shortest-path run.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    source: NodeId,
    distances: HashMap<NodeId, Weight>,
    previous: HashMap<NodeId, Option<NodeId>>,
}

#[derive(Debug)]
struct State {
    cost: Weight,
    seq: u64,
    node: NodeId,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal costs pop in push order
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra over `topology` rooted at `source`.
///
/// Stale heap entries are skipped on pop instead of being decreased in place.
/// Relaxation is strict, so among equal-cost routes the one relaxed first
/// keeps the predecessor slot.
pub fn calculate_shortest_paths(topology: &Topology, source: &str) -> Result<ShortestPaths> {
    if !topology.contains_node(source) {
        return Err(TopologyError::UnknownNode(source.to_string()));
    }

    let mut distances: HashMap<NodeId, Weight> = HashMap::new();
    let mut previous: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    for node in topology.nodes() {
        distances.insert(node.clone(), Weight::INFINITY);
        previous.insert(node.clone(), None);
    }
    distances.insert(source.to_string(), 0.0);

    heap.push(State {
        cost: 0.0,
        seq,
        node: source.to_string(),
    });

    while let Some(State { cost, node, .. }) = heap.pop() {
        if cost == Weight::INFINITY {
            break;
        }
        // Skip if we've already settled this node
        if !visited.insert(node.clone()) {
            continue;
        }
        debug!("Settled {} at cost {}", node, cost);

        for (neighbor, link_cost) in topology.neighbors(&node)? {
            if visited.contains(neighbor) {
                continue;
            }
            let new_cost = cost + link_cost;

            if new_cost < distances[neighbor] {
                distances.insert(neighbor.clone(), new_cost);
                previous.insert(neighbor.clone(), Some(node.clone()));

                seq += 1;
                heap.push(State {
                    cost: new_cost,
                    seq,
                    node: neighbor.clone(),
                });
            }
        }
    }

    Ok(ShortestPaths {
        source: source.to_string(),
        distances,
        previous,
    })
}

impl ShortestPaths {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Total cost to `dest`; `INFINITY` when unreachable, `None` when unknown.
    pub fn distance(&self, dest: &str) -> Option<Weight> {
        self.distances.get(dest).copied()
    }

    pub fn predecessor(&self, dest: &str) -> Option<&str> {
        self.previous.get(dest).and_then(|p| p.as_deref())
    }

    pub fn is_reachable(&self, dest: &str) -> bool {
        self.distance(dest).is_some_and(|d| d.is_finite())
    }

    /// First hop on the way from the source to `dest`.
    pub fn next_hop(&self, dest: &str) -> Option<&str> {
        if dest == self.source || !self.is_reachable(dest) {
            return None;
        }

        let mut current: &str = self.previous.get_key_value(dest)?.0;
        while let Some(prev) = self.predecessor(current) {
            if prev == self.source {
                return Some(current);
            }
            current = prev;
        }
        None
    }

    /// Hops from the source to `dest`, both ends included.
    pub fn path_to(&self, dest: &str) -> Option<Vec<NodeId>> {
        if !self.is_reachable(dest) {
            return None;
        }

        let mut path = vec![dest.to_string()];
        let mut current = dest;
        while let Some(prev) = self.predecessor(current) {
            path.push(prev.to_string());
            current = prev;
        }

        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(nodes: &[&str], links: &[(&str, &str, f64)]) -> Topology {
        let mut topology = Topology::new();
        for node in nodes {
            topology.add_node(*node).unwrap();
        }
        for (from, to, cost) in links {
            topology.add_edge(from, to, *cost).unwrap();
        }
        topology
    }

    #[test]
    fn test_source_has_zero_cost_and_no_predecessor() {
        let topology = build(&["a", "b"], &[("a", "b", 3.0)]);
        let paths = calculate_shortest_paths(&topology, "a").unwrap();
        assert_eq!(paths.distance("a"), Some(0.0));
        assert_eq!(paths.predecessor("a"), None);
        assert_eq!(paths.next_hop("a"), None);
        assert_eq!(paths.path_to("a"), Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_unknown_source() {
        let topology = build(&["a"], &[]);
        assert!(matches!(
            calculate_shortest_paths(&topology, "b"),
            Err(TopologyError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_prefers_cheaper_indirect_route() {
        let topology = build(
            &["a", "b", "c"],
            &[("a", "c", 10.0), ("a", "b", 1.0), ("b", "c", 2.0)],
        );
        let paths = calculate_shortest_paths(&topology, "a").unwrap();
        assert_eq!(paths.distance("c"), Some(3.0));
        assert_eq!(paths.predecessor("c"), Some("b"));
        assert_eq!(paths.next_hop("c"), Some("b"));
        assert_eq!(
            paths.path_to("c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_disconnected_nodes_are_unreachable() {
        let topology = build(
            &["a", "b", "c", "d"],
            &[("a", "b", 1.0), ("c", "d", 1.0)],
        );
        let paths = calculate_shortest_paths(&topology, "a").unwrap();
        for node in ["c", "d"] {
            assert_eq!(paths.distance(node), Some(f64::INFINITY));
            assert_eq!(paths.predecessor(node), None);
            assert_eq!(paths.next_hop(node), None);
            assert_eq!(paths.path_to(node), None);
            assert!(!paths.is_reachable(node));
        }
    }

    #[test]
    fn test_equal_cost_first_relaxation_wins() {
        // a-b-d and a-c-d both cost 2; b is a's first neighbor.
        let topology = build(
            &["a", "b", "c", "d"],
            &[("a", "b", 1.0), ("a", "c", 1.0), ("b", "d", 1.0), ("c", "d", 1.0)],
        );
        let paths = calculate_shortest_paths(&topology, "a").unwrap();
        assert_eq!(paths.distance("d"), Some(2.0));
        assert_eq!(paths.predecessor("d"), Some("b"));
        assert_eq!(paths.next_hop("d"), Some("b"));

        // Same graph with a's links declared the other way round.
        let topology = build(
            &["a", "b", "c", "d"],
            &[("a", "c", 1.0), ("a", "b", 1.0), ("b", "d", 1.0), ("c", "d", 1.0)],
        );
        let paths = calculate_shortest_paths(&topology, "a").unwrap();
        assert_eq!(paths.distance("d"), Some(2.0));
        assert_eq!(paths.predecessor("d"), Some("c"));
    }

    #[test]
    fn test_zero_weight_links() {
        let topology = build(
            &["a", "b", "c"],
            &[("a", "b", 0.0), ("b", "c", 0.0), ("a", "c", 1.0)],
        );
        let paths = calculate_shortest_paths(&topology, "a").unwrap();
        assert_eq!(paths.distance("c"), Some(0.0));
        assert_eq!(paths.next_hop("c"), Some("b"));
    }

    #[test]
    fn test_fractional_weights() {
        let topology = build(
            &["a", "b", "c"],
            &[("a", "b", 0.5), ("b", "c", 0.25), ("a", "c", 1.0)],
        );
        let paths = calculate_shortest_paths(&topology, "a").unwrap();
        assert_eq!(paths.distance("c"), Some(0.75));
    }
}
