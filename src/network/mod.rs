pub mod edge_list;
pub mod topology;

pub use topology::{EdgePolicy, Link, Topology, MAX_WEIGHT};
