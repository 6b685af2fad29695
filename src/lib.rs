pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod routing;

use std::sync::Arc;

use parking_lot::RwLock;

pub use error::{Result, TopologyError};
pub use network::edge_list::{load, save};
pub use network::{EdgePolicy, Topology};
pub use routing::{ForwardingTable, Route};

pub type NodeId = String;
pub type Weight = f64;

/// A topology shared between threads. Hold the write lock for the whole of a
/// mutation and the read lock for the whole of a query.
pub type SharedTopology = Arc<RwLock<Topology>>;

pub fn shared(topology: Topology) -> SharedTopology {
    Arc::new(RwLock::new(topology))
}
