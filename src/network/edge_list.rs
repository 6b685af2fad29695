//! Flat edge-list text format.
//!
//! ```text
//! <node_count>,<edge_count>
//! <src>,<dst>,<weight>
//! ```
//!
//! Node labels are not listed on their own; `node_count` is checked against
//! the distinct labels found in the edge lines.

use std::collections::HashSet;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use log::{info, warn};

use super::topology::{EdgePolicy, Topology};
use crate::error::{Result, TopologyError};

pub fn load(text: &str) -> Result<Topology> {
    load_with_policy(text, EdgePolicy::default())
}

/// Parse `text` into a fresh topology. On any error nothing is returned, so a
/// caller's existing topology is never left half-replaced.
pub fn load_with_policy(text: &str, policy: EdgePolicy) -> Result<Topology> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| TopologyError::format(1, "missing header"))?;
    let (node_count, edge_count) = parse_header(header_line, header)?;

    let mut topology = Topology::with_policy(policy);
    let mut labels: HashSet<String> = HashSet::new();

    for expected in 0..edge_count {
        let (line_no, line) = lines.next().ok_or_else(|| {
            TopologyError::format(
                header_line,
                format!("header declares {} edges, found {}", edge_count, expected),
            )
        })?;
        let (from, to, cost) = parse_edge(line_no, line)?;

        for label in [from, to] {
            if labels.insert(label.to_string()) {
                topology
                    .add_node(label)
                    .map_err(|e| TopologyError::format(line_no, e.to_string()))?;
            }
        }
        topology
            .add_edge(from, to, cost)
            .map_err(|e| TopologyError::format(line_no, e.to_string()))?;
    }

    if let Some((line_no, _)) = lines.next() {
        return Err(TopologyError::format(
            line_no,
            format!("header declares {} edges but more lines follow", edge_count),
        ));
    }
    if labels.len() != node_count {
        return Err(TopologyError::format(
            header_line,
            format!(
                "header declares {} nodes, edges reference {}",
                node_count,
                labels.len()
            ),
        ));
    }

    info!(
        "Loaded topology: {} nodes, {} links",
        topology.node_count(),
        topology.edge_count()
    );
    Ok(topology)
}

/// Render `topology` in the edge-list format, links in insertion order.
///
/// Isolated nodes cannot be expressed by the format and are left out with a
/// warning. Labels that would break the line structure are a format error.
pub fn save(topology: &Topology) -> Result<String> {
    let isolated: Vec<&str> = topology
        .nodes()
        .iter()
        .filter(|n| topology.neighbors(n).map(|adj| adj.is_empty()).unwrap_or(true))
        .map(String::as_str)
        .collect();
    if !isolated.is_empty() {
        warn!("Isolated nodes are not saved: {:?}", isolated);
    }

    for label in topology.links().iter().flat_map(|l| [&l.from, &l.to]) {
        if !is_writable_label(label) {
            return Err(TopologyError::format(
                0,
                format!("label {:?} cannot be written to an edge list", label),
            ));
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{},{}",
        topology.node_count() - isolated.len(),
        topology.edge_count()
    );
    for link in topology.links() {
        let _ = writeln!(out, "{},{},{}", link.from, link.to, link.cost);
    }
    Ok(out)
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<Topology> {
    load_from_file_with_policy(path, EdgePolicy::default())
}

pub fn load_from_file_with_policy(path: impl AsRef<Path>, policy: EdgePolicy) -> Result<Topology> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    info!("Reading topology from {}", path.display());
    load_with_policy(&text, policy)
}

/// Parse a link cost written as a plain integer or decimal (`3`, `2.5`, `.5`).
/// Signs, exponents and named values such as `inf` are refused.
pub fn parse_weight(field: &str) -> Option<f64> {
    let (whole, fraction) = field.split_once('.').unwrap_or((field, ""));
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !digits_only(whole) || !digits_only(fraction) {
        return None;
    }
    field.parse().ok()
}

pub fn save_to_file(topology: &Topology, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = save(topology)?;
    fs::write(path, text)?;
    info!(
        "Saved topology to {} ({} links)",
        path.display(),
        topology.edge_count()
    );
    Ok(())
}

fn parse_header(line_no: usize, header: &str) -> Result<(usize, usize)> {
    let fields: Vec<&str> = header.split(',').map(str::trim).collect();
    let [nodes, edges] = fields.as_slice() else {
        return Err(TopologyError::format(
            line_no,
            format!("expected <node_count>,<edge_count>, got {:?}", header),
        ));
    };
    let parse = |field: &str, what: &str| {
        field.parse::<usize>().map_err(|_| {
            TopologyError::format(line_no, format!("invalid {} {:?}", what, field))
        })
    };
    Ok((parse(*nodes, "node count")?, parse(*edges, "edge count")?))
}

fn parse_edge(line_no: usize, line: &str) -> Result<(&str, &str, f64)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [from, to, cost] = fields.as_slice() else {
        return Err(TopologyError::format(
            line_no,
            format!("expected <src>,<dst>,<weight>, got {:?}", line),
        ));
    };
    if from.is_empty() || to.is_empty() {
        return Err(TopologyError::format(line_no, "empty node label"));
    }
    let cost = parse_weight(cost)
        .ok_or_else(|| TopologyError::format(line_no, format!("invalid weight {:?}", cost)))?;
    Ok((*from, *to, cost))
}

fn is_writable_label(label: &str) -> bool {
    !label.is_empty()
        && label.trim() == label
        && !label.contains([',', '\n', '\r'])
}
