use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};
use crate::{NodeId, Weight};

/// Largest accepted link cost. A path of up to `u32::MAX` links at this cost
/// still sums to a finite distance.
pub const MAX_WEIGHT: Weight = f64::MAX / u32::MAX as f64;

/// What `add_edge` does when the two endpoints are already connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Overwrite the existing weight, keeping the edge's position.
    #[default]
    Replace,
    /// Fail with `DuplicateEdge`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub cost: Weight,
}

impl Link {
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    pub fn touches(&self, node: &str) -> bool {
        self.from == node || self.to == node
    }
}

/// Undirected weighted graph of labelled nodes.
///
/// Nodes and links are kept in insertion order so that neighbor iteration,
/// shortest-path tie-breaking and saved files are all reproducible.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: Vec<NodeId>,
    adjacency: HashMap<NodeId, Vec<(NodeId, Weight)>>,
    links: Vec<Link>,
    policy: EdgePolicy,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: EdgePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    pub fn add_node(&mut self, label: impl Into<NodeId>) -> Result<()> {
        let label = label.into();
        if self.adjacency.contains_key(&label) {
            return Err(TopologyError::DuplicateNode(label));
        }

        debug!("Adding node {}", label);
        self.adjacency.insert(label.clone(), Vec::new());
        self.nodes.push(label);
        Ok(())
    }

    pub fn remove_node(&mut self, label: &str) -> Result<()> {
        let incident = self
            .adjacency
            .remove(label)
            .ok_or_else(|| TopologyError::UnknownNode(label.to_string()))?;

        for (neighbor, _) in &incident {
            if let Some(entries) = self.adjacency.get_mut(neighbor) {
                entries.retain(|(n, _)| n != label);
            }
        }
        self.links.retain(|link| !link.touches(label));
        self.nodes.retain(|n| n != label);

        debug!("Removed node {} and {} incident links", label, incident.len());
        Ok(())
    }

    pub fn add_edge(&mut self, from: &str, to: &str, cost: Weight) -> Result<()> {
        for endpoint in [from, to] {
            if !self.adjacency.contains_key(endpoint) {
                return Err(TopologyError::UnknownNode(endpoint.to_string()));
            }
        }
        if from == to {
            return Err(TopologyError::SelfLoop(from.to_string()));
        }
        if !(0.0..=MAX_WEIGHT).contains(&cost) {
            return Err(TopologyError::InvalidWeight(cost));
        }
        // Adding 0.0 folds -0.0 into 0.0.
        let cost = cost + 0.0;

        if let Some(link) = self.links.iter_mut().find(|l| l.connects(from, to)) {
            if self.policy == EdgePolicy::Reject {
                return Err(TopologyError::DuplicateEdge(from.to_string(), to.to_string()));
            }
            debug!("Replacing cost of {}-{}: {} -> {}", from, to, link.cost, cost);
            link.cost = cost;
            self.set_adjacent_cost(from, to, cost);
            self.set_adjacent_cost(to, from, cost);
            return Ok(());
        }

        debug!("Adding link {}-{} cost {}", from, to, cost);
        self.links.push(Link {
            from: from.to_string(),
            to: to.to_string(),
            cost,
        });
        if let Some(entries) = self.adjacency.get_mut(from) {
            entries.push((to.to_string(), cost));
        }
        if let Some(entries) = self.adjacency.get_mut(to) {
            entries.push((from.to_string(), cost));
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let index = self
            .links
            .iter()
            .position(|l| l.connects(from, to))
            .ok_or_else(|| TopologyError::UnknownEdge(from.to_string(), to.to_string()))?;

        self.links.remove(index);
        if let Some(entries) = self.adjacency.get_mut(from) {
            entries.retain(|(n, _)| n != to);
        }
        if let Some(entries) = self.adjacency.get_mut(to) {
            entries.retain(|(n, _)| n != from);
        }

        debug!("Removed link {}-{}", from, to);
        Ok(())
    }

    /// Neighbors of `label` with the connecting link cost, in link insertion order.
    pub fn neighbors(&self, label: &str) -> Result<&[(NodeId, Weight)]> {
        self.adjacency
            .get(label)
            .map(Vec::as_slice)
            .ok_or_else(|| TopologyError::UnknownNode(label.to_string()))
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.adjacency.contains_key(label)
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<Weight> {
        self.links
            .iter()
            .find(|l| l.connects(from, to))
            .map(|l| l.cost)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.adjacency.clear();
        self.links.clear();
    }

    fn set_adjacent_cost(&mut self, from: &str, to: &str, cost: Weight) {
        if let Some(entry) = self
            .adjacency
            .get_mut(from)
            .and_then(|entries| entries.iter_mut().find(|(n, _)| n == to))
        {
            entry.1 = cost;
        }
    }

    fn edge_set(&self) -> HashSet<(&str, &str, u64)> {
        self.links
            .iter()
            .map(|l| {
                let (a, b) = if l.from <= l.to {
                    (l.from.as_str(), l.to.as_str())
                } else {
                    (l.to.as_str(), l.from.as_str())
                };
                (a, b, l.cost.to_bits())
            })
            .collect()
    }
}

/// Two topologies are equal when they hold the same nodes and the same
/// undirected links with the same costs, regardless of insertion order.
impl PartialEq for Topology {
    fn eq(&self, other: &Self) -> bool {
        let ours: HashSet<&NodeId> = self.nodes.iter().collect();
        let theirs: HashSet<&NodeId> = other.nodes.iter().collect();
        ours == theirs && self.edge_set() == other.edge_set()
    }
}
