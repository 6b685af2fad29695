use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algorithms::{calculate_shortest_paths, ShortestPaths};
use crate::error::{Result, TopologyError};
use crate::network::Topology;
use crate::{NodeId, Weight};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Route {
    Reachable { next_hop: NodeId, cost: Weight },
    Unreachable,
}

impl Route {
    pub fn next_hop(&self) -> Option<&str> {
        match self {
            Route::Reachable { next_hop, .. } => Some(next_hop.as_str()),
            Route::Unreachable => None,
        }
    }

    pub fn cost(&self) -> Option<Weight> {
        match self {
            Route::Reachable { cost, .. } => Some(*cost),
            Route::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Route::Reachable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardingEntry {
    pub destination: NodeId,
    #[serde(flatten)]
    pub route: Route,
}

/// Next hop and cost from one source toward every other node.
///
/// Entries follow the topology's node insertion order. The table is a
/// snapshot: it is not updated when the topology changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardingTable {
    source: NodeId,
    entries: Vec<ForwardingEntry>,
}

impl ForwardingTable {
    pub fn build(topology: &Topology, source: &str) -> Result<Self> {
        let paths = calculate_shortest_paths(topology, source)?;
        Ok(Self::from_paths(topology, &paths))
    }

    fn from_paths(topology: &Topology, paths: &ShortestPaths) -> Self {
        let source = paths.source();
        let entries: Vec<ForwardingEntry> = topology
            .nodes()
            .iter()
            .filter(|dest| dest.as_str() != source)
            .map(|dest| {
                let route = match (paths.next_hop(dest), paths.distance(dest)) {
                    (Some(hop), Some(cost)) if cost.is_finite() => Route::Reachable {
                        next_hop: hop.to_string(),
                        cost,
                    },
                    _ => Route::Unreachable,
                };
                ForwardingEntry {
                    destination: dest.clone(),
                    route,
                }
            })
            .collect();

        debug!(
            "Forwarding table for {}: {} of {} destinations reachable",
            source,
            entries.iter().filter(|e| e.route.is_reachable()).count(),
            entries.len()
        );

        Self {
            source: source.to_string(),
            entries,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn get(&self, destination: &str) -> Option<&Route> {
        self.entries
            .iter()
            .find(|e| e.destination == destination)
            .map(|e| &e.route)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForwardingEntry> {
        self.entries.iter()
    }

    pub fn reachable(&self) -> impl Iterator<Item = &ForwardingEntry> {
        self.entries.iter().filter(|e| e.route.is_reachable())
    }

    pub fn unreachable(&self) -> impl Iterator<Item = &ForwardingEntry> {
        self.entries.iter().filter(|e| !e.route.is_reachable())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ForwardingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DEST: &str = "Destination";
        const HOP: &str = "Next hop";

        let dest_width = self
            .entries
            .iter()
            .map(|e| e.destination.len())
            .chain([DEST.len()])
            .max()
            .unwrap_or(DEST.len());
        let hop_width = self
            .entries
            .iter()
            .filter_map(|e| e.route.next_hop().map(str::len))
            .chain([HOP.len()])
            .max()
            .unwrap_or(HOP.len());

        writeln!(f, "Forwarding table for {}", self.source)?;
        writeln!(f, "{:<dest_width$}  {:<hop_width$}  Cost", DEST, HOP)?;
        for entry in &self.entries {
            match &entry.route {
                Route::Reachable { next_hop, cost } => writeln!(
                    f,
                    "{:<dest_width$}  {:<hop_width$}  {}",
                    entry.destination, next_hop, cost
                )?,
                Route::Unreachable => writeln!(
                    f,
                    "{:<dest_width$}  {:<hop_width$}  unreachable",
                    entry.destination, "-"
                )?,
            }
        }
        Ok(())
    }
}

/// Full route between two nodes, as shown by the `path` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathReport {
    pub source: NodeId,
    pub destination: NodeId,
    pub cost: Option<Weight>,
    pub hops: Vec<NodeId>,
}

impl PathReport {
    pub fn build(topology: &Topology, source: &str, destination: &str) -> Result<Self> {
        if !topology.contains_node(destination) {
            return Err(TopologyError::UnknownNode(destination.to_string()));
        }
        let paths = calculate_shortest_paths(topology, source)?;
        let hops = paths.path_to(destination).unwrap_or_default();
        let cost = paths.distance(destination).filter(|c| c.is_finite());

        Ok(Self {
            source: source.to_string(),
            destination: destination.to_string(),
            cost,
            hops,
        })
    }
}

/// Forwarding tables for every node, in node insertion order.
pub fn forwarding_tables(topology: &Topology) -> Result<Vec<ForwardingTable>> {
    topology
        .nodes()
        .iter()
        .map(|node| ForwardingTable::build(topology, node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Topology {
        let mut topology = Topology::new();
        for label in ["a", "b", "c", "island"] {
            topology.add_node(label).unwrap();
        }
        topology.add_edge("a", "b", 1.0).unwrap();
        topology.add_edge("b", "c", 2.0).unwrap();
        topology
    }

    #[test]
    fn test_build_covers_every_other_node() {
        let table = ForwardingTable::build(&line(), "a").unwrap();
        assert_eq!(table.source(), "a");
        assert_eq!(table.len(), 3);
        assert!(table.get("a").is_none());

        let destinations: Vec<&str> = table.iter().map(|e| e.destination.as_str()).collect();
        assert_eq!(destinations, ["b", "c", "island"]);

        assert_eq!(
            table.get("b"),
            Some(&Route::Reachable { next_hop: "b".to_string(), cost: 1.0 })
        );
        assert_eq!(
            table.get("c"),
            Some(&Route::Reachable { next_hop: "b".to_string(), cost: 3.0 })
        );
        assert_eq!(table.get("island"), Some(&Route::Unreachable));
        assert_eq!(table.reachable().count(), 2);
        assert_eq!(table.unreachable().count(), 1);
    }

    #[test]
    fn test_single_node_table_is_empty() {
        let mut topology = Topology::new();
        topology.add_node("solo").unwrap();
        let table = ForwardingTable::build(&topology, "solo").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_source() {
        assert!(matches!(
            ForwardingTable::build(&line(), "nowhere"),
            Err(TopologyError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_display() {
        let table = ForwardingTable::build(&line(), "a").unwrap();
        let rendered = table.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Forwarding table for a");
        assert_eq!(lines[1], "Destination  Next hop  Cost");
        assert_eq!(lines[2], "b            b         1");
        assert_eq!(lines[3], "c            b         3");
        assert_eq!(lines[4], "island       -         unreachable");
    }

    #[test]
    fn test_json_shape() {
        let table = ForwardingTable::build(&line(), "a").unwrap();
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["source"], "a");
        assert_eq!(value["entries"][1]["destination"], "c");
        assert_eq!(value["entries"][1]["status"], "reachable");
        assert_eq!(value["entries"][1]["next_hop"], "b");
        assert_eq!(value["entries"][2]["status"], "unreachable");
    }

    #[test]
    fn test_path_report() {
        let report = PathReport::build(&line(), "c", "a").unwrap();
        assert_eq!(report.hops, ["c", "b", "a"]);
        assert_eq!(report.cost, Some(3.0));

        let report = PathReport::build(&line(), "a", "island").unwrap();
        assert!(report.hops.is_empty());
        assert_eq!(report.cost, None);

        assert!(matches!(
            PathReport::build(&line(), "a", "ghost"),
            Err(TopologyError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_tables_for_every_node() {
        let tables = forwarding_tables(&line()).unwrap();
        let sources: Vec<&str> = tables.iter().map(|t| t.source()).collect();
        assert_eq!(sources, ["a", "b", "c", "island"]);
        assert_eq!(tables[3].reachable().count(), 0);
    }
}
