use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("no edge between {0} and {1}")]
    UnknownEdge(NodeId, NodeId),

    #[error("edge between {0} and {1} already exists")]
    DuplicateEdge(NodeId, NodeId),

    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),

    #[error("invalid weight {0}: must be finite and non-negative")]
    InvalidWeight(f64),

    #[error("format error at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl TopologyError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        TopologyError::Format {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TopologyError>;
